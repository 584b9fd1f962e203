//! HTTP routes and handlers.
//!
//! Every handler takes [`crate::auth::CurrentUser`] (populated by the JWT
//! extractor) and resolves its tenant via `CurrentUser::effective_tenant`
//! against the `X-Tenant-ID` header, which the auth layer only honors in
//! development. Route bodies stay thin — all business rules live in the
//! domain services under `crate::orders`, `crate::payments`, etc.; a
//! handler's job is request parsing, tenant resolution and shaping the
//! `ApiResponse` envelope.

pub mod auth;
pub mod cash;
pub mod catalog;
pub mod customer;
pub mod dining_room;
pub mod health;
pub mod orders;
pub mod payments;
pub mod printing;
pub mod rate_limit;
pub mod saft;

use axum::Router;
use axum::middleware;

use crate::auth::middleware::require_auth;
use crate::core::ServerState;

/// A development-only convenience: the `X-Tenant-ID` header lets a
/// super-admin address a specific tenant without minting a token per
/// tenant. Ignored outside `development`/`test`.
pub const TENANT_HEADER: &str = "x-tenant-id";

pub fn header_tenant(headers: &axum::http::HeaderMap, state: &ServerState) -> Option<String> {
    if state.config.is_production() {
        return None;
    }
    headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(dining_room::routes())
        .merge(orders::routes())
        .merge(payments::routes())
        .merge(cash::routes())
        .merge(printing::routes())
        .merge(customer::routes())
        .merge(saft::routes())
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health::routes())
        .merge(api)
        .with_state(state)
}
