//! Cash register models: register → session → movement, plus
//! immutable closing reports.

use serde::{Deserialize, Serialize};
use shared::Money;
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashSessionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashSession {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub register_id: String,
    pub employee_id: String,
    pub opening_amount: Money,
    pub actual_close: Option<Money>,
    pub variance: Option<Money>,
    pub status: CashSessionStatus,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CashMovementType {
    Sale,
    Refund,
    Deposit,
    Withdrawal,
    Opening,
    Closing,
}

impl CashMovementType {
    /// Only these two may be recorded through the manual endpoint.
    pub fn is_manually_recordable(&self) -> bool {
        matches!(self, CashMovementType::Deposit | CashMovementType::Withdrawal)
    }

    /// `expected = opening + Σ(SALE,DEPOSIT) − Σ(REFUND,WITHDRAWAL)`.
    pub fn sign(&self) -> i64 {
        match self {
            CashMovementType::Sale | CashMovementType::Deposit | CashMovementType::Opening => 1,
            CashMovementType::Refund | CashMovementType::Withdrawal | CashMovementType::Closing => -1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub session_id: String,
    pub movement_type: CashMovementType,
    pub amount: Money,
    /// Links a SALE/REFUND movement back to the `Payment` it was generated
    /// from — the idempotency guard for the event-driven listener.
    pub payment_id: Option<String>,
    pub note: Option<String>,
    pub recorded_by: Option<String>,
    pub recorded_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashClosingType {
    Session,
    Register,
    Day,
    FinancialPeriod,
}

/// An immutable aggregate over a window of sessions. Reports are
/// regenerated by reading this row, never by re-scanning movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashClosing {
    pub id: Option<RecordId>,
    pub tenant: String,
    /// Present for SESSION/REGISTER/DAY closings; DAY closings are
    /// restricted to a single site (see DESIGN.md).
    pub site: Option<String>,
    pub closing_type: CashClosingType,
    pub window_start: i64,
    pub window_end: i64,
    pub session_ids: Vec<String>,
    pub total_sales: Money,
    pub total_refunds: Money,
    pub total_variance: Money,
    pub created_at: i64,
}
