//! Payment processing, voids, fiscal documents and split billing.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use shared::Money;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{FiscalDocument, FiscalDocumentType, Payment, PaymentMethod, SplitShare};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct ProcessPaymentRequest {
    amount: Money,
    method: PaymentMethod,
    idempotency_key: String,
    terminal_id: Option<String>,
    card_last_four: Option<String>,
    /// Present when this payment settles one share of a split bill.
    split_share_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProcessPaymentResponse {
    payment: Payment,
    change: Option<Money>,
}

async fn process_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<ProcessPaymentRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<ProcessPaymentResponse>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let outcome = state
        .payments
        .process_payment(
            &tenant,
            &order_id,
            body.amount,
            body.method,
            &body.idempotency_key,
            body.terminal_id.as_deref(),
            body.card_last_four.as_deref(),
            body.split_share_id.as_deref(),
        )
        .await?;
    Ok(ok(ProcessPaymentResponse {
        payment: outcome.payment,
        change: outcome.change,
    }))
}

async fn list_payments(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Payment>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let payments = state.payments.payments_for_order(&tenant, &order_id).await?;
    Ok(ok(payments))
}

#[derive(Debug, Deserialize)]
struct VoidPaymentRequest {
    reason: String,
}

async fn void_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(payment_id): Path<String>,
    Json(body): Json<VoidPaymentRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Payment>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let payment = state
        .payments
        .void_payment(&tenant, user.role, &payment_id, body.reason)
        .await?;
    Ok(ok(payment))
}

#[derive(Debug, Deserialize)]
struct GenerateFiscalDocumentRequest {
    site: String,
    document_type: FiscalDocumentType,
    customer_tax_id: Option<String>,
}

async fn generate_fiscal_document(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<GenerateFiscalDocumentRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<FiscalDocument>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let document = state
        .payments
        .generate_fiscal_document(&tenant, &body.site, &order_id, body.document_type, body.customer_tax_id)
        .await?;
    Ok(ok(document))
}

async fn list_fiscal_documents(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<FiscalDocument>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let documents = state.payments.fiscal_documents_for_order(&tenant, &order_id).await?;
    Ok(ok(documents))
}

#[derive(Debug, Serialize)]
struct SubtotalResponse {
    content: String,
}

async fn print_subtotal(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<SubtotalResponse>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let content = state.payments.print_subtotal(&tenant, &order_id).await?;
    Ok(ok(SubtotalResponse { content }))
}

#[derive(Debug, Deserialize)]
struct SplitBillRequest {
    shares: u32,
}

async fn split_bill(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<SplitBillRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<SplitShare>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let shares = state.payments.split_bill(&tenant, &order_id, body.shares).await?;
    Ok(ok(shares))
}

async fn split_shares(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(split_group_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<SplitShare>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let shares = state.payments.split_shares_for_group(&tenant, &split_group_id).await?;
    Ok(ok(shares))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/orders/{order_id}/payments", post(process_payment).get(list_payments))
        .route("/api/payments/{payment_id}/void", post(void_payment))
        .route(
            "/api/orders/{order_id}/fiscal-documents",
            post(generate_fiscal_document).get(list_fiscal_documents),
        )
        .route("/api/orders/{order_id}/subtotal", get(print_subtotal))
        .route("/api/orders/{order_id}/split", post(split_bill))
        .route("/api/split-groups/{split_group_id}/shares", get(split_shares))
}
