//! Printer and print job repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{PrintJob, PrintJobStatus, Printer, PrinterStatus};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct PrinterRepository {
    base: BaseRepository,
}

impl PrinterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        tenant: &str,
        site: &str,
        name: &str,
        zones: Vec<String>,
        address: Option<String>,
    ) -> RepoResult<Printer> {
        let printer = Printer {
            id: None,
            tenant: tenant.to_string(),
            site: site.to_string(),
            name: name.to_string(),
            status: PrinterStatus::Normal,
            redirect_to_printer_id: None,
            zones,
            address,
        };
        let created: Option<Printer> = self.base.db().create("printer").content(printer).await?;
        created.ok_or_else(|| RepoError::Database("failed to create printer".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<Printer>> {
        let thing = make_thing("printer", id);
        let printer: Option<Printer> = self.base.db().select(thing).await?;
        Ok(printer.filter(|p| p.tenant == tenant))
    }

    pub async fn find_by_zone(&self, tenant: &str, site: &str, zone: &str) -> RepoResult<Vec<Printer>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM printer WHERE tenant = $tenant AND site = $site AND zones CONTAINS $zone",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .bind(("zone", zone.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_all(&self, tenant: &str, site: &str) -> RepoResult<Vec<Printer>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM printer WHERE tenant = $tenant AND site = $site ORDER BY name")
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Set routing status, optionally with a redirect target. Cycle
    /// rejection (A → B → A) is the caller's job since it requires walking
    /// every printer in the tenant/site, not just this row.
    pub async fn set_status(
        &self,
        tenant: &str,
        id: &str,
        status: PrinterStatus,
        redirect_to_printer_id: Option<String>,
    ) -> RepoResult<Printer> {
        let thing = make_thing("printer", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, redirect_to_printer_id = $redirect \
                 WHERE tenant = $tenant RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("redirect", redirect_to_printer_id))
            .bind(("tenant", tenant.to_string()))
            .await?;
        let rows: Vec<Printer> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("printer {id} not found")))
    }
}

#[derive(Clone)]
pub struct PrintJobRepository {
    base: BaseRepository,
}

impl PrintJobRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Idempotent enqueue keyed on `(tenant, dedupe_key)`: a retried
    /// dispatch for an already-seen key returns the existing job untouched.
    pub async fn enqueue(
        &self,
        tenant: &str,
        order_id: &str,
        line_id: &str,
        printer_id: &str,
        dedupe_key: &str,
        content: String,
    ) -> RepoResult<(PrintJob, bool)> {
        if let Some(existing) = self.find_by_dedupe_key(tenant, dedupe_key).await? {
            return Ok((existing, false));
        }
        let job = PrintJob {
            id: None,
            tenant: tenant.to_string(),
            order_id: order_id.to_string(),
            line_id: line_id.to_string(),
            printer_id: printer_id.to_string(),
            dedupe_key: dedupe_key.to_string(),
            content,
            status: PrintJobStatus::Pending,
            created_at: now_millis(),
        };
        match self.base.db().create::<Option<PrintJob>>("print_job").content(job).await {
            Ok(Some(created)) => Ok((created, true)),
            Ok(None) => Err(RepoError::Database("failed to enqueue print job".into())),
            Err(e) => {
                if let Some(existing) = self.find_by_dedupe_key(tenant, dedupe_key).await? {
                    Ok((existing, false))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<PrintJob>> {
        let thing = make_thing("print_job", id);
        let job: Option<PrintJob> = self.base.db().select(thing).await?;
        Ok(job.filter(|j| j.tenant == tenant))
    }

    pub async fn find_by_dedupe_key(&self, tenant: &str, dedupe_key: &str) -> RepoResult<Option<PrintJob>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM print_job WHERE tenant = $tenant AND dedupe_key = $key LIMIT 1")
            .bind(("tenant", tenant.to_string()))
            .bind(("key", dedupe_key.to_string()))
            .await?;
        let rows: Vec<PrintJob> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<PrintJob>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM print_job WHERE tenant = $tenant AND order_id = $order_id ORDER BY created_at")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_pending_for_printer(&self, tenant: &str, printer_id: &str) -> RepoResult<Vec<PrintJob>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM print_job WHERE tenant = $tenant AND printer_id = $printer_id \
                 AND status = 'PENDING' ORDER BY created_at",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("printer_id", printer_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn set_status(&self, tenant: &str, id: &str, status: PrintJobStatus) -> RepoResult<()> {
        let thing = make_thing("print_job", id);
        self.base
            .db()
            .query("UPDATE $thing SET status = $status WHERE tenant = $tenant")
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(())
    }
}
