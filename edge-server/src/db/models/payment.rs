//! Payment and fiscal document models.

use serde::{Deserialize, Serialize};
use shared::Money;
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
    Voucher,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Voided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    /// `(tenant, idempotency_key)` unique — a retried request with a seen
    /// key returns this row untouched rather than erroring.
    pub idempotency_key: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub terminal_transaction_id: Option<String>,
    /// Non-empty only for a split-bill settlement.
    pub split_group_id: Option<String>,
    pub void_reason: Option<String>,
    pub version: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiscalDocumentType {
    Receipt,
    Invoice,
    CreditNote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalDocument {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub order_id: String,
    pub document_type: FiscalDocumentType,
    /// Gap-free, strictly increasing per `(tenant, site, document_type)`.
    pub document_number: i64,
    pub customer_tax_id: Option<String>,
    pub total_amount: Money,
    pub voided: bool,
    pub void_reason: Option<String>,
    pub issued_at: i64,
}

/// A pending settlement produced by `split_bill` — independently payable,
/// the parent order only closes once every split is COMPLETED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitShare {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    pub split_group_id: String,
    pub share_index: i32,
    pub amount: Money,
    pub settled: bool,
}
