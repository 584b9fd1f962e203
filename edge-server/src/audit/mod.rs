//! Tax-grade, tamper-evident audit trail.
//!
//! # Architecture
//!
//! ```text
//! sensitive operation
//!   ├─ AuditService::log()      → mpsc → AuditWorker → SurrealDB (audit_log table)
//!   └─ AuditService::log_sync() → SurrealDB directly (startup/shutdown)
//!
//! SHA256 hash chain, per tenant: genesis → entry₁ → entry₂ → ... → entryₙ
//! ```
//!
//! # Tamper-evidence guarantees
//!
//! - SHA256 hash chain: every record includes the previous record's hash
//! - append-only: no delete/update entry point
//! - chain verification API: integrity can be checked at any time
//!
//! # Startup detection
//!
//! - LOCK file: detects an abnormal (non-clean) shutdown
//! - 24h gap: detects a long downtime

pub mod service;
pub mod storage;
pub mod types;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{AuditAction, AuditChainVerification, AuditEntry, AuditListResponse, AuditQuery};
pub use worker::AuditWorker;
