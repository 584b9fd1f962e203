//! Rendering input for a single kitchen/print ticket — one line, one printer.

#[derive(Debug, Clone)]
pub struct TicketLine {
    pub item_name: String,
    pub quantity: i32,
    pub modifiers: Vec<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TicketContext {
    pub order_id: String,
    pub table_number: Option<String>,
    pub printer_name: String,
    pub line: TicketLine,
    pub confirmed_at: i64,
    /// `0` for the original dispatch; incremented on each manual reprint.
    pub reprint_count: u32,
}

/// One priced line on an intermediate bill — everything [`TicketLine`]
/// carries plus the money the kitchen ticket never needs to show.
#[derive(Debug, Clone)]
pub struct BillLine {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: shared::Money,
    pub line_total: shared::Money,
}

/// Rendering input for [`print_subtotal`](crate::payments::PaymentService) —
/// a customer-facing preview of the bill that never changes any status.
#[derive(Debug, Clone)]
pub struct BillContext {
    pub order_id: String,
    pub table_number: Option<String>,
    pub lines: Vec<BillLine>,
    pub discount_total: shared::Money,
    pub total_amount: shared::Money,
    pub rendered_at: i64,
}
