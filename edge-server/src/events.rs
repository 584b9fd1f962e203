//! Domain event bus.
//!
//! Every mutating operation that other contexts react to — confirming an
//! order, voiding a line, completing a payment, issuing a fiscal document —
//! publishes its event only after the write that produced it has committed.
//! Listeners (kitchen printing, cash register) run in their own task, read
//! the event off a broadcast channel, and re-derive everything they need
//! from the database rather than trusting the event payload as a cache —
//! so a listener that's briefly behind just does the same read a moment
//! later, and a re-delivered event (after a `Lagged` gap) is handled the
//! same way twice without side effects, guarded by each listener's own
//! dedupe key.

use crate::db::models::{FiscalDocumentType, PaymentMethod};
use shared::Money;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    OrderConfirmed {
        tenant: String,
        site: String,
        order_id: String,
        table_number: Option<String>,
        line_ids: Vec<String>,
        confirmation_ordinal: i64,
        confirmed_at: i64,
    },
    OrderLineVoided {
        tenant: String,
        order_id: String,
        line_id: String,
        reason: String,
        voided_at: i64,
    },
    PaymentCompleted {
        tenant: String,
        site: String,
        order_id: String,
        payment_id: String,
        amount: Money,
        method: PaymentMethod,
        completed_at: i64,
    },
    FiscalDocumentGenerated {
        tenant: String,
        site: String,
        order_id: String,
        document_id: String,
        document_type: FiscalDocumentType,
        document_number: i64,
        issued_at: i64,
    },
}

/// Thin wrapper around a `tokio::sync::broadcast` channel. Cloning an
/// `EventBus` shares the same underlying channel — every clone publishes to,
/// and every subscriber drains from, the same stream.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish never blocks and never fails the caller: with no subscribers
    /// listening `send` returns an error that carries no information worth
    /// acting on, so it's simply logged and dropped.
    pub fn publish(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("domain event published with no active subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}
