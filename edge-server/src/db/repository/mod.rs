//! Repository module
//!
//! Thin wrappers around `Surreal<Db>` for each domain table, plus the shared
//! `BaseRepository` helper and id-handling utilities every repository uses.

pub mod tenant;
pub mod user;

pub mod catalog;
pub mod customer;
pub mod dining_table;

pub mod order;
pub mod payment;

pub mod cash;
pub mod printer;

pub use tenant::{SiteRepository, TenantRepository};
pub use user::{RefreshTokenRepository, UserRepository};

pub use catalog::CatalogRepository;
pub use customer::CustomerRepository;
pub use dining_table::{BlacklistRepository, DiningTableRepository};

pub use order::{ConsumptionRepository, DiscountRepository, OrderLineRepository, OrderRepository};
pub use payment::{FiscalDocumentRepository, PaymentRepository, SplitShareRepository};

pub use cash::{
    CashClosingRepository, CashMovementRepository, CashRegisterRepository, CashSessionRepository,
};
pub use printer::{PrintJobRepository, PrinterRepository};

use shared::error::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Shared handle every repository wraps around.
///
/// Exists so repositories have one common place to grow connection-level
/// concerns (retry policy, instrumentation) without every repository file
/// repeating `Surreal<Db>` plumbing.
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Build a `RecordId` from a table name and an id that may or may not
/// already carry the `table:` prefix.
pub fn make_thing(table: &str, id: &str) -> RecordId {
    let pure_id = strip_table_prefix(table, id);
    RecordId::from_table_key(table, pure_id)
}

/// Strip a leading `"{table}:"` prefix from an id, if present.
///
/// Callers may pass either a bare record key (`"abc123"`) or a fully
/// qualified SurrealDB id (`"employee:abc123"`) interchangeably; repositories
/// normalize to the bare key before building queries.
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    let prefix = format!("{table}:");
    id.strip_prefix(prefix.as_str()).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_table_prefix() {
        assert_eq!(strip_table_prefix("employee", "employee:abc123"), "abc123");
    }

    #[test]
    fn leaves_bare_id_untouched() {
        assert_eq!(strip_table_prefix("employee", "abc123"), "abc123");
    }

    #[test]
    fn ignores_a_different_tables_prefix() {
        assert_eq!(strip_table_prefix("employee", "role:abc123"), "role:abc123");
    }
}
