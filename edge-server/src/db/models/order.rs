//! Order lifecycle models: `Order`, `OrderLine`, `Consumption` and
//! `Discount`. These four tables form one aggregate — lines, consumptions
//! and discounts never survive their parent order.

use serde::{Deserialize, Serialize};
use shared::Money;
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    DineIn,
    Delivery,
    Takeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Confirmed,
    Paid,
    Closed,
    Voided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub order_type: OrderType,
    pub table_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub version: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderLineStatus {
    Pending,
    Confirmed,
    Voided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    pub item_id: String,
    pub item_name: String,
    pub print_zone: String,
    pub quantity: i32,
    /// Price snapshot taken at `add_line` time — never re-read from the
    /// live catalog afterwards.
    pub unit_price: Money,
    pub modifiers: Vec<String>,
    pub notes: Option<String>,
    pub status: OrderLineStatus,
    pub version: i64,
    pub voided_at: Option<i64>,
}

impl OrderLine {
    /// Confirmed lines contribute to the order total; voided lines never
    /// do, regardless of their prior status.
    pub fn contributes_to_total(&self) -> bool {
        matches!(
            self.status,
            OrderLineStatus::Pending | OrderLineStatus::Confirmed
        )
    }

    pub fn line_total(&self) -> Money {
        if self.status == OrderLineStatus::Voided {
            return Money::ZERO;
        }
        let mut total = Money::ZERO;
        for _ in 0..self.quantity {
            total = total + self.unit_price;
        }
        total
    }
}

/// Append-only audit record produced when a line transitions
/// PENDING → CONFIRMED. `voided_at` is stamped later if the confirming line
/// is voided, but the record itself is never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumption {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    pub line_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i32,
    pub confirmed_at: i64,
    pub voided_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTarget {
    Order,
    Line,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub order_id: String,
    pub line_id: Option<String>,
    pub target: DiscountTarget,
    pub discount_type: DiscountType,
    /// Percentage (0..=100) or fixed money amount depending on `discount_type`.
    pub amount: Money,
    pub computed_amount: Money,
    pub reason: String,
    pub applied_by: String,
    pub applied_at: i64,
}
