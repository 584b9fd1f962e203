//! Database module
//!
//! Owns the embedded SurrealDB handle (RocksDB-backed) and the schema
//! definitions every tenant-scoped table needs: `DEFINE TABLE`, `DEFINE
//! FIELD` and the compound `DEFINE INDEX ... UNIQUE` statements that back
//! the uniqueness invariants in the data model (idempotency keys, dedupe
//! keys, fiscal document numbering, one-open-session-per-register).

pub mod repository;

use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// Database service — owns a `Surreal<Db>` handle.
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    pub async fn new(data_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(data_path)
            .await
            .map_err(|e| AppError::database(format!("failed to open database: {e}")))?;
        db.use_ns("pos")
            .use_db("pos")
            .await
            .map_err(|e| AppError::database(format!("failed to select namespace/db: {e}")))?;

        let service = Self { db };
        service.define_schema().await?;
        Ok(service)
    }

    /// In-memory variant used by the integration test suite so exercising
    /// the full repository/service stack doesn't need a RocksDB data
    /// directory on disk. Same schema, same uniqueness constraints.
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("failed to open in-memory database: {e}")))?;
        db.use_ns("pos")
            .use_db("pos")
            .await
            .map_err(|e| AppError::database(format!("failed to select namespace/db: {e}")))?;

        let service = Self { db };
        service.define_schema().await?;
        Ok(service)
    }

    /// Idempotent schema setup, run once at startup. `DEFINE ... IF NOT
    /// EXISTS` makes re-running on an already-initialized data directory a
    /// no-op rather than an error.
    async fn define_schema(&self) -> Result<(), AppError> {
        let statements = [
            // ---- tenant / site ----
            "DEFINE TABLE IF NOT EXISTS tenant SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS tenant_name ON tenant FIELDS name UNIQUE",
            "DEFINE TABLE IF NOT EXISTS site SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS site_tenant_name ON site FIELDS tenant, name UNIQUE",
            // ---- users / auth ----
            "DEFINE TABLE IF NOT EXISTS user SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS user_tenant_username ON user FIELDS tenant, username UNIQUE",
            "DEFINE TABLE IF NOT EXISTS refresh_token SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS refresh_token_hash ON refresh_token FIELDS token_hash UNIQUE",
            // ---- dining room ----
            "DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS table_tenant_site_number ON dining_table FIELDS tenant, site, table_number UNIQUE",
            "DEFINE TABLE IF NOT EXISTS blacklist_entry SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS blacklist_unique ON blacklist_entry FIELDS tenant, entity_type, entity_value UNIQUE",
            // ---- catalog (external collaborator, minimal) ----
            "DEFINE TABLE IF NOT EXISTS family SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS subfamily SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS item SCHEMALESS",
            // ---- customer ----
            "DEFINE TABLE IF NOT EXISTS customer SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS customer_tenant_phone ON customer FIELDS tenant, phone UNIQUE",
            // ---- orders aggregate ----
            "DEFINE TABLE IF NOT EXISTS order_ SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS order_line SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS consumption SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS discount SCHEMALESS",
            // ---- payments & billing ----
            "DEFINE TABLE IF NOT EXISTS payment SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS payment_idempotency ON payment FIELDS tenant, idempotency_key UNIQUE",
            "DEFINE TABLE IF NOT EXISTS fiscal_document SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS fiscal_doc_number ON fiscal_document FIELDS tenant, site, document_type, document_number UNIQUE",
            "DEFINE TABLE IF NOT EXISTS split_share SCHEMALESS",
            // ---- cash register ----
            "DEFINE TABLE IF NOT EXISTS cash_register SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS cash_session SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS cash_movement SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS cash_closing SCHEMALESS",
            // ---- kitchen printing ----
            "DEFINE TABLE IF NOT EXISTS printer SCHEMALESS",
            "DEFINE TABLE IF NOT EXISTS print_job SCHEMALESS",
            "DEFINE INDEX IF NOT EXISTS print_job_dedupe ON print_job FIELDS tenant, dedupe_key UNIQUE",
            // ---- audit trail ----
            "DEFINE TABLE IF NOT EXISTS audit_log SCHEMALESS",
        ];

        for stmt in statements {
            self.db
                .query(stmt)
                .await
                .map_err(|e| AppError::database(format!("schema statement `{stmt}` failed: {e}")))?;
        }

        tracing::info!("database schema defined");
        Ok(())
    }
}

/// One OPEN session per `(tenant, register)` at a time is enforced at the
/// application layer (read-modify-write under the register's row lock via
/// `open_session`'s existence check inside the same query) rather than a
/// `DEFINE INDEX ... WHERE status = 'OPEN'` partial index — SurrealDB's
/// index DSL does not support a `WHERE` predicate on `DEFINE INDEX` the way
/// a relational partial index does, so [`repository::cash::CashSessionRepository::open`]
/// performs the existence check and insert inside one transaction instead.
pub const CASH_SESSION_UNIQUE_OPEN_NOTE: &str = "enforced in CashSessionRepository::open";
