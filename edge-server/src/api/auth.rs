//! Login/refresh/logout. `login` and `refresh` are public per
//! [`crate::auth::middleware::require_auth`]'s own allow-list; `logout`
//! requires a valid access token like every other `/api` route.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::auth::service::LoginRequest;
use crate::core::ServerState;
use crate::utils::{AppResult, ok};

async fn login(
    State(state): State<ServerState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<crate::auth::LoginResponse>>> {
    let response = state.auth.login(body).await?;
    Ok(ok(response))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

async fn refresh(
    State(state): State<ServerState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<crate::auth::LoginResponse>>> {
    let response = state.auth.refresh(&body.refresh_token).await?;
    Ok(ok(response))
}

#[derive(Debug, Deserialize)]
struct LogoutRequest {
    refresh_token: String,
}

async fn logout(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(body): Json<LogoutRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<()>>> {
    state.auth.logout(&body.refresh_token).await?;
    Ok(ok(()))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
}
