//! Unauthenticated liveness endpoint, outside the `/api` prefix so the auth
//! layer's path check never touches it.

use axum::Json;
use axum::Router;
use axum::routing::get;
use serde::Serialize;

use crate::core::ServerState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn routes() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}
