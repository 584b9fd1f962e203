//! SAF-T export endpoint. Returns the rendered XML document directly rather
//! than wrapping it in the JSON envelope every other route uses — this is a
//! file download, not a resource.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::auth::permissions::{Permission, role_has_permission};
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::error::AppError;

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct SaftExportQuery {
    site: String,
    from: i64,
    to: i64,
}

async fn export(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<SaftExportQuery>,
) -> AppResult<Response> {
    if !role_has_permission(user.role, Permission::ExportFiscalReport) {
        return Err(AppError::permission_denied(
            "generating a SAF-T export requires EXPORT_FISCAL_REPORT",
        ));
    }
    let tenant = tenant_of(&user, &headers, &state)?;
    let xml = state
        .saft
        .export(&tenant, &query.site, query.from, query.to, Some(user.id.clone()))
        .await?;

    let mut response = xml.into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    Ok(response)
}

pub fn routes() -> Router<ServerState> {
    Router::new().route("/api/reports/saft", get(export))
}
