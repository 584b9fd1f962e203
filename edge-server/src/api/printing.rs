//! Kitchen printer registration, routing configuration, and manual reprint.

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use serde::Deserialize;

use crate::api::header_tenant;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{PrintJob, Printer, PrinterStatus};
use crate::utils::{AppResult, ok};

fn tenant_of(user: &CurrentUser, headers: &HeaderMap, state: &ServerState) -> AppResult<String> {
    user.effective_tenant(header_tenant(headers, state).as_deref())
        .map(str::to_string)
        .ok_or_else(crate::utils::AppError::unauthorized)
}

#[derive(Debug, Deserialize)]
struct CreatePrinterRequest {
    site: String,
    name: String,
    zones: Vec<String>,
    #[serde(default)]
    address: Option<String>,
}

async fn create_printer(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<CreatePrinterRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Printer>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let printer = state
        .printing
        .create_printer(&tenant, &body.site, &body.name, body.zones, body.address)
        .await?;
    Ok(ok(printer))
}

#[derive(Debug, Deserialize)]
struct SiteQuery {
    site: String,
}

async fn list_printers(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<SiteQuery>,
) -> AppResult<Json<crate::utils::ApiResponse<Vec<Printer>>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let printers = state.printing.list_printers(&tenant, &query.site).await?;
    Ok(ok(printers))
}

async fn reprint(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(print_job_id): Path<String>,
) -> AppResult<Json<crate::utils::ApiResponse<PrintJob>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let job = state.printing.reprint(&tenant, user.role, &print_job_id).await?;
    Ok(ok(job))
}

#[derive(Debug, Deserialize)]
struct ConfigurePrinterRequest {
    status: PrinterStatus,
    redirect_to_printer_id: Option<String>,
}

async fn configure_printer(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(printer_id): Path<String>,
    Json(body): Json<ConfigurePrinterRequest>,
) -> AppResult<Json<crate::utils::ApiResponse<Printer>>> {
    let tenant = tenant_of(&user, &headers, &state)?;
    let printer = state
        .printing
        .configure_printer(&tenant, user.role, &printer_id, body.status, body.redirect_to_printer_id)
        .await?;
    Ok(ok(printer))
}

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/printers", post(create_printer).get(list_printers))
        .route("/api/printers/{printer_id}/configure", post(configure_printer))
        .route("/api/print-jobs/{print_job_id}/reprint", post(reprint))
}
