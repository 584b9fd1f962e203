//! Menu catalog: the Family -> Subfamily -> Item hierarchy the order core
//! resolves items from. No pricing-rule engine, no categories CRUD beyond
//! this — see `crate::db::models::catalog`.

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{patch, post};
use serde::Deserialize;
use shared::Money;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Family, Item, Subfamily};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct CreateFamily {
    name: String,
}

async fn create_family(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateFamily>,
) -> AppResult<Json<crate::utils::ApiResponse<Family>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let family = state.catalog.create_family(&tenant, &body.name).await?;
    Ok(ok(family))
}

#[derive(Debug, Deserialize)]
struct CreateSubfamily {
    family: String,
    name: String,
}

async fn create_subfamily(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateSubfamily>,
) -> AppResult<Json<crate::utils::ApiResponse<Subfamily>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let subfamily = state
        .catalog
        .create_subfamily(&tenant, &body.family, &body.name)
        .await?;
    Ok(ok(subfamily))
}

#[derive(Debug, Deserialize)]
struct CreateItem {
    subfamily: String,
    name: String,
    base_price: Money,
    print_zone: String,
}

async fn create_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreateItem>,
) -> AppResult<Json<crate::utils::ApiResponse<Item>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let item = Item {
        id: None,
        tenant,
        subfamily: body.subfamily,
        name: body.name,
        base_price: body.base_price,
        available: true,
        print_zone: body.print_zone,
    };
    let item = state.catalog.create_item(item).await?;
    Ok(ok(item))
}

async fn list_items(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Item>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let items = state.catalog.find_all_items(&tenant).await?;
    Ok(ok(items))
}

#[derive(Debug, Deserialize)]
struct SetAvailability {
    available: bool,
}

async fn set_availability(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(body): Json<SetAvailability>,
) -> AppResult<Json<crate::utils::ApiResponse<()>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    state
        .catalog
        .set_availability(&tenant, &item_id, body.available)
        .await?;
    Ok(ok(()))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/catalog/families", post(create_family))
        .route("/api/catalog/subfamilies", post(create_subfamily))
        .route("/api/catalog/items", post(create_item).get(list_items))
        .route("/api/catalog/items/{item_id}/availability", patch(set_availability))
}
