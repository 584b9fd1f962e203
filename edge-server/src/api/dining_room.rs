//! Table lifecycle and the cross-cutting blacklist.

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use serde::Deserialize;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BlacklistEntityType, BlacklistEntry, DiningTable, DiningTableCreate};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

async fn create_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<DiningTableCreate>,
) -> AppResult<Json<crate::utils::ApiResponse<DiningTable>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let table = state.dining_room.create_table(&tenant, body).await?;
    Ok(ok(table))
}

#[derive(Debug, Deserialize)]
struct SiteQuery {
    site: String,
}

async fn list_tables(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<SiteQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<DiningTable>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let tables = state.dining_room.list_tables(&tenant, &query.site).await?;
    Ok(ok(tables))
}

async fn open_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(table_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<DiningTable>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let table = state.dining_room.open(&tenant, &table_id).await?;
    Ok(ok(table))
}

async fn close_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(table_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<DiningTable>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let table = state.dining_room.close(&tenant, &table_id).await?;
    Ok(ok(table))
}

async fn block_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(table_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<DiningTable>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let table = state.dining_room.block(&tenant, &table_id).await?;
    Ok(ok(table))
}

async fn unblock_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(table_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<DiningTable>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let table = state.dining_room.unblock(&tenant, &table_id).await?;
    Ok(ok(table))
}

#[derive(Debug, Deserialize)]
struct TransferTableRequest {
    to_table_id: String,
}

async fn transfer_table(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(table_id): Path<String>,
    Json(body): Json<TransferTableRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<()>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    state
        .dining_room
        .transfer(&tenant, &table_id, &body.to_table_id)
        .await?;
    Ok(ok(()))
}

#[derive(Debug, Deserialize)]
struct BlacklistRequest {
    entity_type: BlacklistEntityType,
    entity_value: String,
    reason: Option<String>,
}

async fn add_blacklist(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<BlacklistRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<BlacklistEntry>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let entry = state
        .dining_room
        .add_to_blacklist(&tenant, body.entity_type, &body.entity_value, body.reason)
        .await?;
    Ok(ok(entry))
}

#[derive(Debug, Deserialize)]
struct RemoveBlacklistQuery {
    entity_type: BlacklistEntityType,
    entity_value: String,
}

async fn remove_blacklist(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<RemoveBlacklistQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<()>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    state
        .dining_room
        .remove_from_blacklist(&tenant, query.entity_type, &query.entity_value)
        .await?;
    Ok(ok(()))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/tables", post(create_table).get(list_tables))
        .route("/api/tables/{table_id}/open", post(open_table))
        .route("/api/tables/{table_id}/close", post(close_table))
        .route("/api/tables/{table_id}/block", post(block_table))
        .route("/api/tables/{table_id}/unblock", post(unblock_table))
        .route("/api/tables/{table_id}/transfer", post(transfer_table))
        .route("/api/blacklist", post(add_blacklist).delete(remove_blacklist))
}
