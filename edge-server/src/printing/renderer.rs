//! Kitchen ticket renderer — ESC/POS bytes for one order line.

use chrono_tz::Tz;
use crab_printer::EscPosBuilder;

use super::types::{BillContext, TicketContext};

/// Minimal per-line ticket: table → item (qty first) → modifiers/notes →
/// timestamp. One ticket per `PrintJob`, matching the one-line-per-job
/// dispatch model.
pub struct KitchenTicketRenderer {
    width: usize,
    timezone: Tz,
}

impl KitchenTicketRenderer {
    /// Common widths: 58mm paper = 32 chars, 80mm paper = 48 chars.
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    pub fn render(&self, ctx: &TicketContext) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);

        b.center();
        b.double_size();
        b.bold();
        let title = ctx.table_number.as_deref().unwrap_or("Para llevar");
        b.line(title);
        b.bold_off();
        b.reset_size();
        b.left();

        let timestamp = format_timestamp(ctx.confirmed_at, self.timezone);
        b.line_lr(&ctx.printer_name, &timestamp);
        b.sep_double();

        b.bold();
        b.double_size();
        b.line(&format!("{}x {}", ctx.line.quantity, ctx.line.item_name));
        b.reset_size();
        b.bold_off();

        for modifier in &ctx.line.modifiers {
            b.line(&format!("  > {modifier}"));
        }
        if let Some(note) = &ctx.line.notes
            && !note.is_empty()
        {
            b.bold();
            b.line(&format!("  ** {note} **"));
            b.bold_off();
        }

        b.sep_double();
        if ctx.reprint_count > 0 {
            b.center();
            b.bold();
            b.line(&format!("** REIMPRESION #{} **", ctx.reprint_count));
            b.bold_off();
            b.left();
        }
        b.feed(2);
        b.cut();

        b.build()
    }
}

impl Default for KitchenTicketRenderer {
    fn default() -> Self {
        Self::new(48, chrono_tz::Europe::Madrid)
    }
}

/// Renders `print_subtotal`'s customer-facing bill preview: every line with
/// its quantity, unit price and line total, the discount total if any, and
/// the grand total — no status is changed by rendering this, so unlike
/// [`KitchenTicketRenderer`] there is no dedupe key or job row involved.
pub struct BillReceiptRenderer {
    width: usize,
    timezone: Tz,
}

impl BillReceiptRenderer {
    pub fn new(width: usize, timezone: Tz) -> Self {
        Self { width, timezone }
    }

    pub fn render(&self, ctx: &BillContext) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);

        b.center();
        b.bold();
        b.line("CUENTA (NO VALIDO COMO FACTURA)");
        b.bold_off();
        if let Some(table) = &ctx.table_number {
            b.line(table);
        }
        b.left();
        b.sep_single();

        for line in &ctx.lines {
            let label = format!("{}x {}", line.quantity, line.item_name);
            b.line_lr(&label, &line.line_total.as_decimal().to_string());
            b.line(&format!("  @ {}", line.unit_price.as_decimal()));
        }

        b.sep_single();
        if !ctx.discount_total.is_zero() {
            b.line_lr("Descuento", &format!("-{}", ctx.discount_total.as_decimal()));
        }
        b.bold();
        b.line_lr("TOTAL", &ctx.total_amount.as_decimal().to_string());
        b.bold_off();

        b.sep_double();
        let timestamp = format_timestamp(ctx.rendered_at, self.timezone);
        b.center();
        b.line(&timestamp);
        b.feed(2);
        b.cut();

        b.build()
    }
}

impl Default for BillReceiptRenderer {
    fn default() -> Self {
        Self::new(48, chrono_tz::Europe::Madrid)
    }
}

fn format_timestamp(ts: i64, tz: Tz) -> String {
    if let Some(dt) = chrono::DateTime::from_timestamp_millis(ts) {
        dt.with_timezone(&tz).format("%H:%M:%S").to_string()
    } else {
        "--:--".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::types::TicketLine;

    fn sample_ctx() -> TicketContext {
        TicketContext {
            order_id: "order-1".to_string(),
            table_number: Some("B1".to_string()),
            printer_name: "Kitchen".to_string(),
            line: TicketLine {
                item_name: "Espresso".to_string(),
                quantity: 2,
                modifiers: vec!["Sin azúcar".to_string()],
                notes: Some("Extra caliente".to_string()),
            },
            confirmed_at: 1_705_912_335_000,
            reprint_count: 0,
        }
    }

    #[test]
    fn renders_non_empty_ticket() {
        let renderer = KitchenTicketRenderer::default();
        let bytes = renderer.render(&sample_ctx());
        assert!(bytes.len() > 50);
    }

    #[test]
    fn reprint_adds_marker_bytes() {
        let renderer = KitchenTicketRenderer::default();
        let mut ctx = sample_ctx();
        let base = renderer.render(&ctx).len();
        ctx.reprint_count = 1;
        let reprinted = renderer.render(&ctx).len();
        assert!(reprinted > base);
    }

    #[test]
    fn bill_renders_every_line_and_total() {
        use crate::printing::types::BillLine;
        let renderer = BillReceiptRenderer::default();
        let ctx = BillContext {
            order_id: "order-1".to_string(),
            table_number: Some("B1".to_string()),
            lines: vec![
                BillLine {
                    item_name: "Espresso".to_string(),
                    quantity: 2,
                    unit_price: shared::Money::from_cents(250),
                    line_total: shared::Money::from_cents(500),
                },
                BillLine {
                    item_name: "Muffin".to_string(),
                    quantity: 1,
                    unit_price: shared::Money::from_cents(300),
                    line_total: shared::Money::from_cents(300),
                },
            ],
            discount_total: shared::Money::ZERO,
            total_amount: shared::Money::from_cents(800),
            rendered_at: 1_705_912_335_000,
        };
        let bytes = renderer.render(&ctx);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Espresso"));
        assert!(text.contains("Muffin"));
        assert!(text.contains("TOTAL"));
    }
}
