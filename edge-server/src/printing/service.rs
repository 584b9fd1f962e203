//! Kitchen print dispatch: resolves a line's printer zone to a concrete
//! printer through the REDIRECT/WAIT/IGNORE routing chain, renders a ticket
//! and enqueues a dedupe-keyed [`PrintJob`].

use std::collections::HashSet;
use std::sync::Arc;

use base64::Engine;
use sha2::{Digest, Sha256};

use shared::error::{AppError, ErrorCode};

use crate::auth::permissions::{Permission, role_has_permission};
use crate::db::models::{PrintJob, PrintJobStatus, Printer, PrinterStatus, Role};
use crate::db::repository::{OrderLineRepository, PrintJobRepository, PrinterRepository};

use super::renderer::KitchenTicketRenderer;
use super::transport::{PrinterTransport, TransmitOutcome};
use super::types::{TicketContext, TicketLine};

/// Routing chains longer than this are treated as a cycle — there are never
/// legitimately more hops than printers configured at a site.
const MAX_ROUTING_HOPS: usize = 32;

/// Where a routing walk landed: the terminal printer plus what dispatch
/// should do about it. `NORMAL` is the only outcome that attempts an actual
/// transmission; `WAIT` leaves the job `PENDING` for a future sweep, and
/// `IGNORE` never transmits at all.
enum RouteOutcome {
    Transmit(Printer),
    Wait(Printer),
    Skipped(Printer),
}

#[derive(Clone)]
pub struct KitchenPrintService {
    printers: PrinterRepository,
    jobs: PrintJobRepository,
    lines: OrderLineRepository,
    renderer: Arc<KitchenTicketRenderer>,
    transport: Arc<dyn PrinterTransport>,
}

impl KitchenPrintService {
    pub fn new(
        printers: PrinterRepository,
        jobs: PrintJobRepository,
        lines: OrderLineRepository,
        renderer: KitchenTicketRenderer,
        transport: Arc<dyn PrinterTransport>,
    ) -> Arc<Self> {
        Arc::new(Self {
            printers,
            jobs,
            lines,
            renderer: Arc::new(renderer),
            transport,
        })
    }

    /// Dispatches every confirmed line of an order to its zone's printer.
    /// One line with no matching printer at the site is logged and skipped —
    /// it does not fail the other lines' dispatch.
    #[allow(clippy::too_many_arguments)]
    pub async fn dispatch_for_order(
        &self,
        tenant: &str,
        site: &str,
        order_id: &str,
        table_number: Option<String>,
        line_ids: &[String],
        confirmation_ordinal: i64,
        confirmed_at: i64,
    ) -> Result<(), AppError> {
        for line_id in line_ids {
            let Some(line) = self.lines.find_by_id(tenant, line_id).await? else {
                continue;
            };
            let candidates = self.printers.find_by_zone(tenant, site, &line.print_zone).await?;
            let Some(start) = candidates.into_iter().next() else {
                tracing::warn!(
                    tenant,
                    site,
                    zone = %line.print_zone,
                    "no printer configured for zone; print job skipped"
                );
                continue;
            };

            let route = self.resolve_route(tenant, start).await?;
            let target = match &route {
                RouteOutcome::Transmit(p) | RouteOutcome::Wait(p) | RouteOutcome::Skipped(p) => p,
            };

            let ctx = TicketContext {
                order_id: order_id.to_string(),
                table_number: table_number.clone(),
                printer_name: target.name.clone(),
                line: TicketLine {
                    item_name: line.item_name.clone(),
                    quantity: line.quantity,
                    modifiers: line.modifiers.clone(),
                    notes: line.notes.clone(),
                },
                confirmed_at,
                reprint_count: 0,
            };
            let rendered = self.renderer.render(&ctx);
            let content = base64::engine::general_purpose::STANDARD.encode(&rendered);
            let dedupe_key = dedupe_hash(order_id, line_id, &printer_id(target), confirmation_ordinal);

            let (job, was_new) = self
                .jobs
                .enqueue(tenant, order_id, line_id, &printer_id(target), &dedupe_key, content)
                .await?;
            // `was_new` guards every terminal transition below: a redelivered
            // `OrderConfirmed` event lands on the same dedupe key and must not
            // re-skip, or worse re-transmit, a job already resolved.
            if !was_new {
                continue;
            }
            match route {
                RouteOutcome::Skipped(_) => {
                    self.jobs.set_status(tenant, &job_id(&job), PrintJobStatus::Skipped).await?;
                }
                RouteOutcome::Wait(_) => {}
                RouteOutcome::Transmit(target) => {
                    self.transmit_and_resolve(tenant, &job, &target, &rendered).await?;
                }
            }
        }
        Ok(())
    }

    /// Resolves a `PrintJob`'s final status and returns the record with that
    /// status applied, so callers returning the job to an API caller don't
    /// hand back a stale `PENDING` value.
    async fn resolve_and_apply(
        &self,
        tenant: &str,
        mut job: PrintJob,
        route: RouteOutcome,
        target: &Printer,
        rendered: &[u8],
    ) -> Result<PrintJob, AppError> {
        match route {
            RouteOutcome::Skipped(_) => {
                self.jobs.set_status(tenant, &job_id(&job), PrintJobStatus::Skipped).await?;
                job.status = PrintJobStatus::Skipped;
            }
            RouteOutcome::Wait(_) => {}
            RouteOutcome::Transmit(_) => {
                job.status = self.transmit_and_resolve(tenant, &job, target, rendered).await?;
            }
        }
        Ok(job)
    }

    /// Hands rendered bytes to [`PrinterTransport`] and records the outcome
    /// as the job's terminal status — `PRINTED` or `FAILED`, mirroring how
    /// `PaymentService` resolves a charge through `PaymentTerminal`.
    async fn transmit_and_resolve(
        &self,
        tenant: &str,
        job: &PrintJob,
        target: &Printer,
        rendered: &[u8],
    ) -> Result<PrintJobStatus, AppError> {
        let status = match self.transport.transmit(target.address.as_deref(), rendered).await {
            TransmitOutcome::Sent => PrintJobStatus::Printed,
            TransmitOutcome::Failed { reason } => {
                tracing::warn!(
                    tenant,
                    printer = %target.name,
                    error = %reason,
                    "kitchen ticket transmission failed"
                );
                PrintJobStatus::Failed
            }
        };
        self.jobs.set_status(tenant, &job_id(job), status).await?;
        Ok(status)
    }

    pub async fn create_printer(
        &self,
        tenant: &str,
        site: &str,
        name: &str,
        zones: Vec<String>,
        address: Option<String>,
    ) -> Result<Printer, AppError> {
        Ok(self.printers.create(tenant, site, name, zones, address).await?)
    }

    pub async fn list_printers(&self, tenant: &str, site: &str) -> Result<Vec<Printer>, AppError> {
        Ok(self.printers.find_all(tenant, site).await?)
    }

    /// Manual reprint, exempt from dedupe via a fresh nonce. Requires
    /// [`Permission::ReprintDocument`].
    pub async fn reprint(&self, tenant: &str, role: Role, print_job_id: &str) -> Result<PrintJob, AppError> {
        if !role_has_permission(role, Permission::ReprintDocument) {
            return Err(AppError::permission_denied("reprinting a kitchen ticket requires REPRINT_DOCUMENT"));
        }
        let original = self
            .jobs
            .find_by_dedupe_key(tenant, print_job_id)
            .await?
            .or(self.jobs.find_by_id(tenant, print_job_id).await.ok().flatten())
            .ok_or_else(|| AppError::not_found("print job"))?;

        let printer = self
            .printers
            .find_by_id(tenant, &original.printer_id)
            .await?
            .ok_or_else(|| AppError::not_found("printer"))?;
        let route = self.resolve_route(tenant, printer).await?;
        let target = match &route {
            RouteOutcome::Transmit(p) | RouteOutcome::Wait(p) | RouteOutcome::Skipped(p) => p.clone(),
        };

        let line = self
            .lines
            .find_by_id(tenant, &original.line_id)
            .await?
            .ok_or_else(|| AppError::not_found("order line"))?;

        let ctx = TicketContext {
            order_id: original.order_id.clone(),
            table_number: None,
            printer_name: target.name.clone(),
            line: TicketLine {
                item_name: line.item_name.clone(),
                quantity: line.quantity,
                modifiers: line.modifiers.clone(),
                notes: line.notes.clone(),
            },
            confirmed_at: shared::util::now_millis(),
            reprint_count: 1,
        };
        let rendered = self.renderer.render(&ctx);
        let content = base64::engine::general_purpose::STANDARD.encode(&rendered);
        let nonce = uuid::Uuid::new_v4().to_string();
        let dedupe_key = dedupe_hash(&original.order_id, &original.line_id, &printer_id(&target), 0) + &nonce;

        let (job, was_new) = self
            .jobs
            .enqueue(tenant, &original.order_id, &original.line_id, &printer_id(&target), &dedupe_key, content)
            .await?;
        if !was_new {
            return Ok(job);
        }
        self.resolve_and_apply(tenant, job, route, &target, &rendered).await
    }

    /// Reconfigures a printer's routing. Walks the resulting chain before
    /// committing so a REDIRECT can never create a cycle back to itself.
    pub async fn configure_printer(
        &self,
        tenant: &str,
        role: Role,
        printer_id: &str,
        status: PrinterStatus,
        redirect_to_printer_id: Option<String>,
    ) -> Result<Printer, AppError> {
        if !role_has_permission(role, Permission::RedirectPrinter) {
            return Err(AppError::permission_denied("configuring printer routing requires REDIRECT_PRINTER"));
        }
        if status == PrinterStatus::Redirect {
            let Some(target_id) = &redirect_to_printer_id else {
                return Err(AppError::validation("REDIRECT requires a target printer"));
            };
            let target = self
                .printers
                .find_by_id(tenant, target_id)
                .await?
                .ok_or_else(|| AppError::with_message(ErrorCode::PrinterRedirectTargetInvalid, "redirect target does not exist"))?;
            if self.would_cycle(tenant, &target.site, printer_id, target_id).await? {
                return Err(AppError::with_message(ErrorCode::PrinterRoutingCycle, "this redirect would create a routing cycle"));
            }
        }
        Ok(self.printers.set_status(tenant, printer_id, status, redirect_to_printer_id).await?)
    }

    /// Follows REDIRECT hops starting at `start` until landing on a
    /// NORMAL/WAIT/IGNORE printer, bounding the walk against a misconfigured
    /// cycle that slipped past `configure_printer`'s own check.
    async fn resolve_route(&self, tenant: &str, start: Printer) -> Result<RouteOutcome, AppError> {
        let mut current = start;
        let mut visited = HashSet::new();
        for _ in 0..MAX_ROUTING_HOPS {
            match current.status {
                PrinterStatus::Normal => return Ok(RouteOutcome::Transmit(current)),
                PrinterStatus::Wait => return Ok(RouteOutcome::Wait(current)),
                PrinterStatus::Ignore => return Ok(RouteOutcome::Skipped(current)),
                PrinterStatus::Redirect => {
                    let id = printer_id(&current);
                    if !visited.insert(id.clone()) {
                        return Err(AppError::with_message(ErrorCode::PrinterRoutingCycle, "printer routing chain contains a cycle"));
                    }
                    let Some(next_id) = current.redirect_to_printer_id.clone() else {
                        return Ok(RouteOutcome::Skipped(current));
                    };
                    current = self
                        .printers
                        .find_by_id(tenant, &next_id)
                        .await?
                        .ok_or_else(|| AppError::with_message(ErrorCode::PrinterRedirectTargetInvalid, "redirect target does not exist"))?;
                }
            }
        }
        Err(AppError::with_message(ErrorCode::PrinterRoutingCycle, "printer routing chain exceeded the hop limit"))
    }

    /// Would setting `from_id`'s redirect to `to_id` create a cycle? Walks
    /// forward from `to_id` through every REDIRECT hop looking for `from_id`.
    async fn would_cycle(&self, tenant: &str, site: &str, from_id: &str, to_id: &str) -> Result<bool, AppError> {
        if from_id == to_id {
            return Ok(true);
        }
        let all = self.printers.find_all(tenant, site).await?;
        let mut current_id = to_id.to_string();
        let mut visited = HashSet::new();
        for _ in 0..MAX_ROUTING_HOPS {
            if current_id == from_id {
                return Ok(true);
            }
            if !visited.insert(current_id.clone()) {
                return Ok(true);
            }
            let Some(printer) = all.iter().find(|p| printer_id(p) == current_id) else {
                return Ok(false);
            };
            if printer.status != PrinterStatus::Redirect {
                return Ok(false);
            }
            let Some(next) = &printer.redirect_to_printer_id else {
                return Ok(false);
            };
            current_id = next.clone();
        }
        Ok(true)
    }
}

fn dedupe_hash(order_id: &str, line_id: &str, printer_id: &str, confirmation_ordinal: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(order_id.as_bytes());
    hasher.update(b":");
    hasher.update(line_id.as_bytes());
    hasher.update(b":");
    hasher.update(printer_id.as_bytes());
    hasher.update(b":");
    hasher.update(confirmation_ordinal.to_le_bytes());
    hex::encode(hasher.finalize())
}

fn printer_id(printer: &Printer) -> String {
    printer.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
}

fn job_id(job: &PrintJob) -> String {
    job.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
}
