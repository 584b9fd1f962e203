//! Order/line lifecycle, "Pedir" confirmation, void, discounts, transfer.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use serde::Deserialize;
use shared::Money;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Discount, DiscountType, Order, OrderLine, OrderType};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    site: String,
    order_type: OrderType,
    table_id: Option<String>,
    customer_id: Option<String>,
}

async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateOrderRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state
        .orders
        .create(&tenant, &body.site, body.order_type, body.table_id, body.customer_id)
        .await?;
    Ok(ok(order))
}

async fn get_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state.orders.get(&tenant, &order_id).await?;
    Ok(ok(order))
}

async fn list_lines(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<OrderLine>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let lines = state.orders.lines_for_order(&tenant, &order_id).await?;
    Ok(ok(lines))
}

async fn list_discounts(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Discount>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let discounts = state.orders.discounts_for_order(&tenant, &order_id).await?;
    Ok(ok(discounts))
}

#[derive(Debug, Deserialize)]
struct AddLineRequest {
    item_id: String,
    quantity: i32,
    #[serde(default)]
    modifiers: Vec<String>,
    notes: Option<String>,
}

async fn add_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<AddLineRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<OrderLine>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let line = state
        .orders
        .add_line(&tenant, &order_id, &body.item_id, body.quantity, body.modifiers, body.notes)
        .await?;
    Ok(ok(line))
}

#[derive(Debug, Deserialize)]
struct UpdateLineRequest {
    quantity: Option<i32>,
    notes: Option<String>,
    expected_version: i64,
}

async fn update_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(line_id): Path<String>,
    Json(body): Json<UpdateLineRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<OrderLine>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let line = state
        .orders
        .update_line(&tenant, &line_id, body.quantity, body.notes, body.expected_version)
        .await?;
    Ok(ok(line))
}

async fn confirm_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state.orders.confirm(&tenant, &order_id).await?;
    Ok(ok(order))
}

async fn close_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state.orders.close(&tenant, &order_id).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
struct VoidOrderRequest {
    reason: String,
}

async fn void_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<VoidOrderRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state
        .orders
        .void_order(&tenant, user.role, &order_id, body.reason)
        .await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
struct VoidLineRequest {
    reason: String,
}

async fn void_line(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path((order_id, line_id)): Path<(String, String)>,
    Json(body): Json<VoidLineRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<OrderLine>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let line = state
        .orders
        .void_line(&tenant, user.role, &order_id, &line_id, body.reason)
        .await?;
    Ok(ok(line))
}

#[derive(Debug, Deserialize)]
struct ApplyDiscountRequest {
    line_id: Option<String>,
    discount_type: DiscountType,
    amount: Money,
    reason: String,
}

async fn apply_discount(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<ApplyDiscountRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Discount>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let discount = state
        .orders
        .apply_discount(
            &tenant,
            user.role,
            &order_id,
            body.line_id,
            body.discount_type,
            body.amount,
            body.reason,
            user.id.clone(),
        )
        .await?;
    Ok(ok(discount))
}

#[derive(Debug, Deserialize)]
struct TransferOrderRequest {
    to_table_id: String,
}

async fn transfer_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<TransferOrderRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Order>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let order = state
        .orders
        .transfer_order(&tenant, &order_id, &body.to_table_id)
        .await?;
    Ok(ok(order))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{order_id}", get(get_order))
        .route("/api/orders/{order_id}/lines", get(list_lines).post(add_line))
        .route("/api/orders/{order_id}/discounts", get(list_discounts).post(apply_discount))
        .route("/api/orders/{order_id}/confirm", post(confirm_order))
        .route("/api/orders/{order_id}/close", post(close_order))
        .route("/api/orders/{order_id}/void", post(void_order))
        .route("/api/orders/{order_id}/transfer", post(transfer_order))
        .route("/api/orders/lines/{line_id}", post(update_line))
        .route("/api/orders/{order_id}/lines/{line_id}/void", post(void_line))
}
