//! Kitchen printer and print job models.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrinterStatus {
    Normal,
    Wait,
    Ignore,
    Redirect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Printer {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub name: String,
    pub status: PrinterStatus,
    pub redirect_to_printer_id: Option<String>,
    /// Print zones/categories routed to this printer.
    pub zones: Vec<String>,
    /// `host:port` the transmit step connects to for a `NORMAL` dispatch.
    /// `None` means the printer has never been network-configured — a
    /// `NORMAL`-routed job against it transmits as `FAILED`.
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrintJobStatus {
    Pending,
    Printed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    pub line_id: String,
    pub printer_id: String,
    /// Deterministic hash of `(order, line, printer, confirmation_ordinal)`,
    /// or `(order, line, printer, reprint_nonce)` for a manual reprint.
    /// `(tenant, dedupe_key)` is unique — retried dispatch never duplicates.
    pub dedupe_key: String,
    pub content: String,
    pub status: PrintJobStatus,
    pub created_at: i64,
}
