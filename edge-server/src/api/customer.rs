//! Phone-indexed customer lookup and order history, mainly for delivery.

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Customer, CustomerCreate, CustomerUpdate, Order};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

async fn create_customer(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CustomerCreate>,
) -> AppResult<Json<crate::utils::ApiResponse<Customer>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let customer = state.customer.create(&tenant, body).await?;
    Ok(ok(customer))
}

async fn update_customer(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
    Json(body): Json<CustomerUpdate>,
) -> AppResult<Json<crate::utils::ApiResponse<Customer>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let customer = state.customer.update(&tenant, &customer_id, body).await?;
    Ok(ok(customer))
}

#[derive(Debug, Deserialize)]
struct PhoneQuery {
    phone: String,
}

async fn find_by_phone(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<PhoneQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<Option<Customer>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let customer = state.customer.find_by_phone(&tenant, &query.phone).await?;
    Ok(ok(customer))
}

#[derive(Debug, Deserialize)]
struct PhoneSuffixQuery {
    suffix: String,
}

async fn search_by_phone_suffix(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<PhoneSuffixQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Customer>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let customers = state.customer.search_by_phone_suffix(&tenant, &query.suffix).await?;
    Ok(ok(customers))
}

async fn order_history(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(customer_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Order>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let orders = state.customer.order_history(&tenant, &customer_id).await?;
    Ok(ok(orders))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/customers", post(create_customer).get(find_by_phone))
        .route("/api/customers/search", get(search_by_phone_suffix))
        .route("/api/customers/{customer_id}", post(update_customer))
        .route("/api/customers/{customer_id}/orders", get(order_history))
}
