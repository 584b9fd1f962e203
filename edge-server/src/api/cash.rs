//! Cash register sessions, manual movements, and closings.

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use serde::Deserialize;
use shared::Money;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CashClosing, CashClosingType, CashMovement, CashMovementType, CashRegister, CashSession};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct CreateRegisterRequest {
    site: String,
    name: String,
}

async fn create_register(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateRegisterRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<CashRegister>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let register = state.cash.create_register(&tenant, &body.site, &body.name).await?;
    Ok(ok(register))
}

#[derive(Debug, Deserialize)]
struct SiteQuery {
    site: String,
}

async fn list_registers(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<SiteQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<CashRegister>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let registers = state.cash.list_registers(&tenant, &query.site).await?;
    Ok(ok(registers))
}

#[derive(Debug, Deserialize)]
struct OpenSessionRequest {
    site: String,
    register_id: String,
    opening_amount: Money,
}

async fn open_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<OpenSessionRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<CashSession>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let session = state
        .cash
        .open_session(&tenant, &body.site, &body.register_id, &user.id, body.opening_amount)
        .await?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
struct CloseSessionRequest {
    actual_close: Money,
}

async fn close_session(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(body): Json<CloseSessionRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<CashSession>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let session = state
        .cash
        .close_session(&tenant, user.role, &session_id, body.actual_close)
        .await?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
struct RecordMovementRequest {
    movement_type: CashMovementType,
    amount: Money,
    note: Option<String>,
}

async fn record_manual_movement(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(body): Json<RecordMovementRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<CashMovement>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let movement = state
        .cash
        .record_manual_movement(&tenant, &session_id, body.movement_type, body.amount, body.note, user.id.clone())
        .await?;
    Ok(ok(movement))
}

#[derive(Debug, Deserialize)]
struct CreateClosingRequest {
    closing_type: CashClosingType,
    site: Option<String>,
    register_id: Option<String>,
    window_start: i64,
    window_end: i64,
}

async fn create_closing(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateClosingRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<CashClosing>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let closing = state
        .cash
        .create_closing(
            &tenant,
            user.role,
            body.closing_type,
            body.site,
            body.register_id,
            body.window_start,
            body.window_end,
        )
        .await?;
    Ok(ok(closing))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/cash/registers", post(create_register).get(list_registers))
        .route("/api/cash/sessions", post(open_session))
        .route("/api/cash/sessions/{session_id}/close", post(close_session))
        .route("/api/cash/sessions/{session_id}/movements", post(record_manual_movement))
        .route("/api/cash/closings", post(create_closing))
}
