//! Audit log types
//!
//! Core data structures for the tax-grade, tamper-evident audit trail.
//! Entries are immutable and append-only, chained with SHA256.

use serde::{Deserialize, Serialize};

/// Audit action (a closed enum, never free text).
///
/// Grouped by domain so every sensitive operation has an unambiguous type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ system lifecycle ═══
    SystemStartup,
    SystemShutdown,
    SystemAbnormalShutdown,
    SystemLongDowntime,

    // ═══ authentication ═══
    LoginSuccess,
    LoginFailed,
    Logout,
    TokenRefreshed,

    // ═══ users & roles ═══
    UserCreated,
    UserUpdated,
    UserDeactivated,
    RoleAssigned,

    // ═══ dining room ═══
    TableOpened,
    TableClosed,
    TableBlacklisted,
    TableUnblacklisted,

    // ═══ orders ═══
    OrderConfirmed,
    OrderLineVoided,
    OrderDiscountApplied,
    OrderTransferred,
    OrderClosed,
    OrderVoided,

    // ═══ payments & fiscal documents ═══
    PaymentRecorded,
    FiscalDocumentIssued,
    FiscalDocumentVoided,

    // ═══ cash register ═══
    CashSessionOpened,
    CashSessionClosed,
    CashMovementRecorded,

    // ═══ printing ═══
    PrintJobDispatched,
    PrintJobReprinted,
    PrinterRedirected,

    // ═══ customers ═══
    CustomerCreated,
    CustomerUpdated,

    // ═══ fiscal reporting ═══
    SaftExportGenerated,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An immutable audit log entry.
///
/// Every record carries a SHA256 hash chain for tamper-evidence:
/// - `prev_hash`: the hash of the previous record
/// - `curr_hash`: this record's hash (covers `prev_hash` plus every field)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Globally increasing sequence number (unique id)
    pub id: u64,
    /// Tenant this entry belongs to
    pub tenant_id: String,
    /// Timestamp, Unix milliseconds
    pub timestamp: i64,
    pub action: AuditAction,
    /// Resource type, e.g. "order", "user", "system"
    pub resource_type: String,
    /// Resource id, e.g. "order:xxx"
    pub resource_id: String,
    /// Operator id; `None` for system-originated events
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    /// Structured, JSON-encoded details
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// Audit log query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AuditQuery {
    pub tenant_id: String,
    /// Inclusive start, Unix milliseconds
    pub from: Option<i64>,
    /// Inclusive end, Unix milliseconds
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub operator_id: Option<String>,
    pub resource_type: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub items: Vec<AuditEntry>,
    pub total: u64,
}

/// Result of walking the hash chain for a tenant.
#[derive(Debug, Clone, Serialize)]
pub struct AuditChainVerification {
    pub entries_checked: u64,
    pub intact: bool,
    /// Sequence number of the first mismatch, if any
    pub broken_at: Option<u64>,
}
