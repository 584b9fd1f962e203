//! Payments and billing: idempotent payment processing, voids, fiscal
//! document issuance and split billing.

pub mod terminal;

pub use terminal::{HttpPaymentTerminal, MockPaymentTerminal, PaymentTerminal, TerminalOutcome};

use std::sync::Arc;

use shared::Money;
use shared::error::{AppError, ErrorCode};

use crate::auth::permissions::{Permission, role_has_permission};
use crate::cash::CashService;
use crate::db::models::{
    BlacklistEntityType, FiscalDocument, FiscalDocumentType, Order, OrderStatus, Payment,
    PaymentMethod, PaymentStatus, Role, SplitShare,
};
use crate::db::repository::{
    BlacklistRepository, DiningTableRepository, FiscalDocumentRepository, OrderRepository,
    PaymentRepository, SplitShareRepository,
};
use crate::events::{DomainEvent, EventBus};
use crate::printing::{BillContext, BillLine, BillReceiptRenderer};

pub struct PaymentOutcome {
    pub payment: Payment,
    /// Only populated for a `CASH` payment that overpays the remaining
    /// balance — the amount to hand back to the customer.
    pub change: Option<Money>,
}

#[derive(Clone)]
pub struct PaymentService {
    payments: PaymentRepository,
    fiscal: FiscalDocumentRepository,
    splits: SplitShareRepository,
    orders: OrderRepository,
    blacklist: BlacklistRepository,
    tables: DiningTableRepository,
    terminal: Arc<dyn PaymentTerminal>,
    events: EventBus,
    bill_renderer: Arc<BillReceiptRenderer>,
    cash: Arc<CashService>,
}

impl PaymentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        payments: PaymentRepository,
        fiscal: FiscalDocumentRepository,
        splits: SplitShareRepository,
        orders: OrderRepository,
        blacklist: BlacklistRepository,
        tables: DiningTableRepository,
        terminal: Arc<dyn PaymentTerminal>,
        events: EventBus,
        bill_renderer: Arc<BillReceiptRenderer>,
        cash: Arc<CashService>,
    ) -> Arc<Self> {
        Arc::new(Self {
            payments,
            fiscal,
            splits,
            orders,
            blacklist,
            tables,
            terminal,
            events,
            bill_renderer,
            cash,
        })
    }

    async fn get_order(&self, tenant: &str, order_id: &str) -> Result<Order, AppError> {
        self.orders
            .find_by_id(tenant, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))
    }

    pub async fn get_payment(&self, tenant: &str, payment_id: &str) -> Result<Payment, AppError> {
        self.payments
            .find_by_id(tenant, payment_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment"))
    }

    pub async fn payments_for_order(&self, tenant: &str, order_id: &str) -> Result<Vec<Payment>, AppError> {
        Ok(self.payments.find_by_order(tenant, order_id).await?)
    }

    pub async fn fiscal_documents_for_order(
        &self,
        tenant: &str,
        order_id: &str,
    ) -> Result<Vec<FiscalDocument>, AppError> {
        Ok(self.fiscal.find_by_order(tenant, order_id).await?)
    }

    pub async fn split_shares_for_group(
        &self,
        tenant: &str,
        split_group_id: &str,
    ) -> Result<Vec<SplitShare>, AppError> {
        Ok(self.splits.find_by_group(tenant, split_group_id).await?)
    }

    async fn remaining_balance(&self, tenant: &str, order: &Order) -> Result<Money, AppError> {
        let paid: Money = self
            .payments
            .find_by_order(tenant, &id_of(&order.id))
            .await?
            .into_iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount)
            .sum();
        Ok(order.total_amount.checked_sub(paid).unwrap_or(Money::ZERO))
    }

    /// Processes one payment toward an order's balance.
    ///
    /// Idempotent on `idempotency_key`: a retried request carrying a
    /// previously-seen key for this tenant returns the original outcome
    /// untouched rather than charging twice. `CASH` may overpay the
    /// remaining balance — the stored amount is clamped to the remaining
    /// balance and the overage is returned as change. Every other method
    /// must not exceed the remaining balance.
    #[allow(clippy::too_many_arguments)]
    pub async fn process_payment(
        &self,
        tenant: &str,
        order_id: &str,
        requested_amount: Money,
        method: PaymentMethod,
        idempotency_key: &str,
        terminal_id: Option<&str>,
        card_last_four: Option<&str>,
        split_share_id: Option<&str>,
    ) -> Result<PaymentOutcome, AppError> {
        // Idempotency is checked before anything else: a retried request
        // carrying a previously-seen key must return the original outcome
        // untouched, even if the order has since been fully settled and
        // would otherwise reject a fresh request for the same amount.
        if let Some(existing) = self.payments.find_by_idempotency_key(tenant, idempotency_key).await? {
            return Ok(PaymentOutcome {
                payment: existing,
                change: None,
            });
        }

        let order = self.get_order(tenant, order_id).await?;
        if order.status == OrderStatus::Voided || order.status == OrderStatus::Closed {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "order is not payable in its current state",
            ));
        }

        // A payment settling one share of a split bill is validated against
        // that share rather than the order's aggregate balance: the share
        // must belong to this order, be unsettled, and carry the exact
        // amount being charged.
        let split_share = match split_share_id {
            Some(id) => {
                let share = self
                    .splits
                    .find_by_id(tenant, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("split share"))?;
                if share.order_id != order_id {
                    return Err(AppError::with_message(
                        ErrorCode::SplitBillInvalidShares,
                        "split share does not belong to this order",
                    ));
                }
                if share.settled {
                    return Err(AppError::with_message(
                        ErrorCode::SplitBillInvalidShares,
                        "split share is already settled",
                    ));
                }
                if share.amount != requested_amount {
                    return Err(AppError::with_message(
                        ErrorCode::SplitBillInvalidShares,
                        "payment amount must match the split share amount",
                    ));
                }
                Some(share)
            }
            None => None,
        };

        let remaining = self.remaining_balance(tenant, &order).await?;
        let (stored_amount, change) = if method == PaymentMethod::Cash
            && requested_amount.as_decimal() > remaining.as_decimal()
        {
            (
                remaining,
                Some(requested_amount.checked_sub(remaining).unwrap_or(Money::ZERO)),
            )
        } else {
            if requested_amount.as_decimal() > remaining.as_decimal() {
                return Err(AppError::with_message(
                    ErrorCode::PaymentExceedsBalance,
                    "payment exceeds the order's remaining balance",
                ));
            }
            (requested_amount, None)
        };

        if method == PaymentMethod::Card {
            if let Some(last_four) = card_last_four {
                if self
                    .blacklist
                    .is_blacklisted(tenant, BlacklistEntityType::Card, last_four)
                    .await?
                {
                    return Err(AppError::with_message(
                        ErrorCode::PaymentInvalidMethod,
                        "card is blacklisted",
                    ));
                }
            }
        }

        let split_group_id = split_share.as_ref().map(|s| s.split_group_id.clone());
        let (payment, was_new) = self
            .payments
            .create_or_get(
                tenant,
                order_id,
                idempotency_key,
                stored_amount,
                method,
                None,
                split_group_id,
            )
            .await?;
        if !was_new {
            // Idempotency-key replay: not an error. Return the original
            // outcome untouched, with no change computed a second time.
            return Ok(PaymentOutcome {
                payment,
                change: None,
            });
        }

        let payment = match method {
            PaymentMethod::Card => {
                let terminal_id = terminal_id.unwrap_or("default");
                match self.terminal.charge(stored_amount, terminal_id).await {
                    TerminalOutcome::Approved { transaction_id } => {
                        self.payments
                            .set_terminal_transaction_id(tenant, &id_of(&payment.id), &transaction_id)
                            .await?;
                        self.payments.complete(tenant, &id_of(&payment.id), payment.version).await?
                    }
                    TerminalOutcome::Declined { reason } => {
                        return Err(AppError::with_message(
                            ErrorCode::PaymentFailed,
                            format!("card declined: {reason}"),
                        ));
                    }
                    TerminalOutcome::Timeout => {
                        return Err(AppError::with_message(
                            ErrorCode::PaymentFailed,
                            "payment terminal timed out",
                        ));
                    }
                    TerminalOutcome::Error { reason } => {
                        return Err(AppError::with_message(
                            ErrorCode::PaymentFailed,
                            format!("payment terminal error: {reason}"),
                        ));
                    }
                }
            }
            _ => self.payments.complete(tenant, &id_of(&payment.id), payment.version).await?,
        };

        if let Some(share) = &split_share {
            self.splits.mark_settled(tenant, &id_of(&share.id)).await?;
        }

        let remaining_after = self.remaining_balance(tenant, &order).await?;
        if remaining_after.is_zero() {
            self.orders
                .set_status(tenant, order_id, OrderStatus::Paid, order.version)
                .await?;
        }

        self.events.publish(DomainEvent::PaymentCompleted {
            tenant: tenant.to_string(),
            site: order.site.clone(),
            order_id: order_id.to_string(),
            payment_id: id_of(&payment.id),
            amount: payment.amount,
            method,
            completed_at: shared::util::now_millis(),
        });

        Ok(PaymentOutcome { payment, change })
    }

    /// Only a `COMPLETED` payment may be voided. Voiding a `CASH` payment
    /// records a compensating `REFUND` cash movement; other methods leave
    /// reconciliation to the external processor.
    pub async fn void_payment(
        &self,
        tenant: &str,
        role: Role,
        payment_id: &str,
        reason: String,
    ) -> Result<Payment, AppError> {
        if !role_has_permission(role, Permission::VoidInvoice) {
            return Err(AppError::permission_denied(
                "voiding a payment requires VOID_INVOICE",
            ));
        }
        let payment = self
            .payments
            .find_by_id(tenant, payment_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment"))?;
        if payment.status != PaymentStatus::Completed {
            return Err(AppError::with_message(
                ErrorCode::PaymentAlreadyRefunded,
                "only a completed payment may be voided",
            ));
        }
        if payment.method == PaymentMethod::Card {
            if let Some(txid) = &payment.terminal_transaction_id {
                self.terminal
                    .refund(txid, payment.amount)
                    .await
                    .map_err(|e| AppError::with_message(ErrorCode::PaymentFailed, e))?;
            }
        }
        let voided = self
            .payments
            .void(tenant, payment_id, &reason, payment.version)
            .await?;
        if voided.method == PaymentMethod::Cash {
            let order = self.get_order(tenant, &voided.order_id).await?;
            self.cash
                .on_payment_voided(tenant, &order.site, payment_id, voided.amount, voided.method)
                .await?;
        }
        Ok(voided)
    }

    /// `INVOICE` requires a customer tax id; every other document type may
    /// omit one. Numbering is allocated atomically per
    /// `(tenant, site, document_type)` by the repository.
    pub async fn generate_fiscal_document(
        &self,
        tenant: &str,
        site: &str,
        order_id: &str,
        document_type: FiscalDocumentType,
        customer_tax_id: Option<String>,
    ) -> Result<FiscalDocument, AppError> {
        if document_type == FiscalDocumentType::Invoice && customer_tax_id.is_none() {
            return Err(AppError::validation("an invoice requires a customer tax id"));
        }
        let order = self.get_order(tenant, order_id).await?;
        let document = self
            .fiscal
            .generate(tenant, site, order_id, document_type, customer_tax_id, order.total_amount)
            .await?;
        self.events.publish(DomainEvent::FiscalDocumentGenerated {
            tenant: tenant.to_string(),
            site: site.to_string(),
            order_id: order_id.to_string(),
            document_id: id_of(&document.id),
            document_type,
            document_number: document.document_number,
            issued_at: document.issued_at,
        });
        Ok(document)
    }

    /// Requires [`Permission::VoidInvoice`] (reprinting a fiscal document is
    /// gated the same way a void is — both touch an issued document).
    pub async fn reprint_document_allowed(&self, role: Role) -> Result<(), AppError> {
        if !role_has_permission(role, Permission::ReprintDocument) {
            return Err(AppError::permission_denied(
                "reprinting a fiscal document requires REPRINT_DOCUMENT",
            ));
        }
        Ok(())
    }

    /// Splits the order's current remaining balance into `n` equal shares,
    /// with any rounding remainder distributed to the first shares. Each
    /// share is settled independently; the order is not touched here.
    pub async fn split_bill(&self, tenant: &str, order_id: &str, n: u32) -> Result<Vec<SplitShare>, AppError> {
        if n == 0 {
            return Err(AppError::with_message(
                ErrorCode::SplitBillInvalidShares,
                "a split requires at least one share",
            ));
        }
        let order = self.get_order(tenant, order_id).await?;
        let remaining = self.remaining_balance(tenant, &order).await?;
        if remaining.is_zero() {
            return Err(AppError::with_message(
                ErrorCode::SplitBillInvalidShares,
                "order has no remaining balance to split",
            ));
        }
        let shares = remaining.split_even(n);
        let group_id = uuid::Uuid::new_v4().to_string();
        Ok(self.splits.create_group(tenant, order_id, &group_id, shares).await?)
    }

    /// Renders a customer-facing preview of the current bill as a base64
    /// ESC/POS payload. Purely a read: no status, version or total is
    /// touched, so it may be called any number of times on the same order.
    pub async fn print_subtotal(&self, tenant: &str, order_id: &str) -> Result<String, AppError> {
        let order = self.get_order(tenant, order_id).await?;
        let lines = self.orders.lines_repo().find_by_order(tenant, order_id).await?;
        let discounts = self.orders.discount_repo().find_by_order(tenant, order_id).await?;

        let table_number = if let Some(table_id) = &order.table_id {
            self.tables.find_by_id(tenant, table_id).await?.map(|t| t.table_number)
        } else {
            None
        };

        let discount_total: Money = discounts.iter().map(|d| d.computed_amount).sum();
        let bill_lines = lines
            .iter()
            .filter(|l| l.contributes_to_total())
            .map(|l| BillLine {
                item_name: l.item_name.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                line_total: l.line_total(),
            })
            .collect();

        let ctx = BillContext {
            order_id: order_id.to_string(),
            table_number,
            lines: bill_lines,
            discount_total,
            total_amount: order.total_amount,
            rendered_at: shared::util::now_millis(),
        };

        let bytes = self.bill_renderer.render(&ctx);
        use base64::Engine;
        Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
    }
}

fn id_of(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref().map(|t| t.to_string()).unwrap_or_default()
}
