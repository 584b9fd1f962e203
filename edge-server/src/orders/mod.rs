//! Order lifecycle: creation, lines, "Pedir" confirmation, voids, discounts
//! and single-order table transfers.

use std::sync::Arc;

use shared::Money;
use shared::error::{AppError, ErrorCode};

use crate::auth::permissions::{Permission, role_has_permission};
use crate::db::models::{
    BlacklistEntityType, Discount, DiscountTarget, DiscountType, Order, OrderLine,
    OrderLineStatus, OrderStatus, OrderType, Role, TableStatus,
};
use crate::db::repository::{
    BlacklistRepository, CatalogRepository, ConsumptionRepository, DiningTableRepository,
    DiscountRepository, OrderLineRepository, OrderRepository,
};
use crate::events::{DomainEvent, EventBus};

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    catalog: CatalogRepository,
    tables: DiningTableRepository,
    blacklist: BlacklistRepository,
    events: EventBus,
}

fn id_of(id: &Option<surrealdb::RecordId>) -> String {
    id.as_ref().map(|t| t.to_string()).unwrap_or_default()
}

impl OrderService {
    pub fn new(
        orders: OrderRepository,
        catalog: CatalogRepository,
        tables: DiningTableRepository,
        blacklist: BlacklistRepository,
        events: EventBus,
    ) -> Arc<Self> {
        Arc::new(Self {
            orders,
            catalog,
            tables,
            blacklist,
            events,
        })
    }

    fn lines(&self) -> OrderLineRepository {
        self.orders.lines_repo()
    }

    fn discounts(&self) -> DiscountRepository {
        self.orders.discount_repo()
    }

    fn consumptions(&self) -> ConsumptionRepository {
        self.orders.consumption_repo()
    }

    async fn get_order(&self, tenant: &str, order_id: &str) -> Result<Order, AppError> {
        self.orders
            .find_by_id(tenant, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))
    }

    /// Public lookup for read endpoints — identical to the private helper,
    /// exposed so handlers don't need their own tenant-scoped fetch logic.
    pub async fn get(&self, tenant: &str, order_id: &str) -> Result<Order, AppError> {
        self.get_order(tenant, order_id).await
    }

    pub async fn lines_for_order(&self, tenant: &str, order_id: &str) -> Result<Vec<OrderLine>, AppError> {
        Ok(self.lines().find_by_order(tenant, order_id).await?)
    }

    pub async fn discounts_for_order(&self, tenant: &str, order_id: &str) -> Result<Vec<Discount>, AppError> {
        Ok(self.discounts().find_by_order(tenant, order_id).await?)
    }

    async fn get_line(&self, tenant: &str, line_id: &str) -> Result<OrderLine, AppError> {
        self.lines()
            .find_by_id(tenant, line_id)
            .await?
            .ok_or_else(|| AppError::not_found("order line"))
    }

    /// `DINE_IN` without a table and `DELIVERY` without a customer are both
    /// rejected here rather than at the schema layer — both fields stay
    /// `Option` on [`Order`] because every other order type legitimately
    /// leaves one or the other empty.
    pub async fn create(
        &self,
        tenant: &str,
        site: &str,
        order_type: OrderType,
        table_id: Option<String>,
        customer_id: Option<String>,
    ) -> Result<Order, AppError> {
        match order_type {
            OrderType::DineIn if table_id.is_none() => {
                return Err(AppError::validation("DINE_IN orders require a table"));
            }
            OrderType::Delivery if customer_id.is_none() => {
                return Err(AppError::validation("DELIVERY orders require a customer"));
            }
            _ => {}
        }
        if let Some(table_id) = &table_id {
            let table = self
                .tables
                .find_by_id(tenant, table_id)
                .await?
                .ok_or_else(|| AppError::not_found("table"))?;
            if self
                .blacklist
                .is_blacklisted(tenant, BlacklistEntityType::Table, &table.table_number)
                .await?
            {
                return Err(AppError::with_message(
                    ErrorCode::TableBlacklisted,
                    "table is blacklisted",
                ));
            }
            if table.status == TableStatus::Available {
                self.tables
                    .transition(tenant, table_id, TableStatus::Occupied, table.version)
                    .await?;
            }
        }
        Ok(self
            .orders
            .create(tenant, site, order_type, table_id, customer_id)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_line(
        &self,
        tenant: &str,
        order_id: &str,
        item_id: &str,
        quantity: i32,
        modifiers: Vec<String>,
        notes: Option<String>,
    ) -> Result<OrderLine, AppError> {
        let order = self.get_order(tenant, order_id).await?;
        if order.status != OrderStatus::Open {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "order is not open",
            ));
        }
        if let Some(table_id) = &order.table_id {
            let table = self
                .tables
                .find_by_id(tenant, table_id)
                .await?
                .ok_or_else(|| AppError::not_found("table"))?;
            if self
                .blacklist
                .is_blacklisted(tenant, BlacklistEntityType::Table, &table.table_number)
                .await?
            {
                return Err(AppError::with_message(
                    ErrorCode::TableBlacklisted,
                    "table is blacklisted",
                ));
            }
        }
        let snapshot = self
            .catalog
            .snapshot(tenant, item_id)
            .await
            .map_err(|e| match e {
                crate::db::repository::RepoError::Validation(msg) => {
                    AppError::with_message(ErrorCode::ValidationFailed, msg)
                }
                other => other.into(),
            })?;
        let line = self
            .lines()
            .add(
                tenant,
                order_id,
                &snapshot.item_id,
                &snapshot.name,
                &snapshot.print_zone,
                quantity,
                snapshot.unit_price,
                modifiers,
                notes,
            )
            .await?;
        self.orders.recompute_total(tenant, order_id).await?;
        Ok(line)
    }

    pub async fn update_line(
        &self,
        tenant: &str,
        line_id: &str,
        quantity: Option<i32>,
        notes: Option<String>,
        expected_version: i64,
    ) -> Result<OrderLine, AppError> {
        let line = self
            .lines()
            .update_quantity_notes(tenant, line_id, quantity, notes, expected_version)
            .await?;
        self.orders.recompute_total(tenant, &line.order_id).await?;
        Ok(line)
    }

    /// "Pedir": every `PENDING` line on the order becomes `CONFIRMED`, a
    /// `Consumption` record is appended for each, and the order itself
    /// transitions `OPEN -> CONFIRMED`. Requires at least one pending line.
    pub async fn confirm(&self, tenant: &str, order_id: &str) -> Result<Order, AppError> {
        let order = self.get_order(tenant, order_id).await?;
        if order.status != OrderStatus::Open {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "order is not open",
            ));
        }
        let pending: Vec<OrderLine> = self
            .lines()
            .find_by_order(tenant, order_id)
            .await?
            .into_iter()
            .filter(|l| l.status == OrderLineStatus::Pending)
            .collect();
        if pending.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::OrderEmpty,
                "order has no pending lines to confirm",
            ));
        }
        // Line confirmation and the order's own status flip commit as one
        // SurrealQL transaction (see `OrderRepository::confirm_transactional`)
        // so the two writes can never be observed half-done.
        let (lines, confirmed) = self
            .orders
            .confirm_transactional(tenant, order_id, order.version)
            .await?;
        for line in &lines {
            if line.status == OrderLineStatus::Confirmed {
                self.consumptions().record(tenant, line).await?;
            }
        }

        let table_number = if let Some(table_id) = &confirmed.table_id {
            self.tables
                .find_by_id(tenant, table_id)
                .await?
                .map(|t| t.table_number)
        } else {
            None
        };
        self.events.publish(DomainEvent::OrderConfirmed {
            tenant: tenant.to_string(),
            site: confirmed.site.clone(),
            order_id: order_id.to_string(),
            table_number,
            line_ids: pending.iter().map(|l| id_of(&l.id)).collect(),
            confirmation_ordinal: confirmed.version,
            confirmed_at: shared::util::now_millis(),
        });
        Ok(confirmed)
    }

    /// Voiding a line after the order's first confirmation ("after
    /// subtotal") requires [`Permission::VoidAfterSubtotal`]; voiding a
    /// still-`PENDING` line on a still-`OPEN` order never does.
    pub async fn void_line(
        &self,
        tenant: &str,
        role: Role,
        order_id: &str,
        line_id: &str,
        reason: String,
    ) -> Result<OrderLine, AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ReasonRequired,
                "a void reason is required",
            ));
        }
        let order = self.get_order(tenant, order_id).await?;
        let line = self.get_line(tenant, line_id).await?;
        if line.order_id != order_id {
            return Err(AppError::not_found("order line"));
        }
        if line.status == OrderLineStatus::Voided {
            return Err(AppError::with_message(
                ErrorCode::OrderLineAlreadyVoided,
                "line already voided",
            ));
        }
        if order.status != OrderStatus::Open && line.status == OrderLineStatus::Confirmed {
            if !role_has_permission(role, Permission::VoidAfterSubtotal) {
                return Err(AppError::permission_denied(
                    "voiding a confirmed line requires VOID_AFTER_SUBTOTAL",
                ));
            }
        }
        let voided = self.lines().void(tenant, line_id, line.version).await?;
        self.consumptions().mark_voided_for_line(tenant, line_id).await?;
        self.orders.recompute_total(tenant, order_id).await?;
        self.events.publish(DomainEvent::OrderLineVoided {
            tenant: tenant.to_string(),
            order_id: order_id.to_string(),
            line_id: line_id.to_string(),
            reason,
            voided_at: shared::util::now_millis(),
        });
        Ok(voided)
    }

    /// Percentage discounts clamp to `[0, 100]`; fixed-amount discounts
    /// clamp to `[0, target_total]` so a discount never drives a line or
    /// order negative.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_discount(
        &self,
        tenant: &str,
        role: Role,
        order_id: &str,
        line_id: Option<String>,
        discount_type: DiscountType,
        amount: Money,
        reason: String,
        applied_by: String,
    ) -> Result<Discount, AppError> {
        if !role_has_permission(role, Permission::ApplyDiscount) {
            return Err(AppError::permission_denied(
                "applying a discount requires APPLY_DISCOUNT",
            ));
        }
        if reason.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ReasonRequired,
                "a discount reason is required",
            ));
        }
        let order = self.get_order(tenant, order_id).await?;

        let (target, target_total) = if let Some(line_id) = &line_id {
            let line = self.get_line(tenant, line_id).await?;
            if line.order_id != order_id {
                return Err(AppError::not_found("order line"));
            }
            (DiscountTarget::Line, line.line_total())
        } else {
            (DiscountTarget::Order, order.total_amount)
        };

        let (clamped_amount, computed_amount) = match discount_type {
            DiscountType::Percentage => {
                let pct = amount.as_decimal().clamp(
                    rust_decimal::Decimal::ZERO,
                    rust_decimal::Decimal::ONE_HUNDRED,
                );
                let clamped = Money::new(pct);
                (clamped, target_total.percentage_of(pct))
            }
            DiscountType::FixedAmount => {
                let clamped = if amount.is_negative() {
                    Money::ZERO
                } else if amount.as_decimal() > target_total.as_decimal() {
                    target_total
                } else {
                    amount
                };
                (clamped, clamped)
            }
        };
        if computed_amount.as_decimal() > target_total.as_decimal() {
            return Err(AppError::with_message(
                ErrorCode::DiscountExceedsTotal,
                "discount exceeds the target total",
            ));
        }

        let discount = self
            .discounts()
            .apply(
                tenant,
                order_id,
                line_id,
                target,
                discount_type,
                clamped_amount,
                computed_amount,
                reason,
                applied_by,
            )
            .await?;
        self.orders.recompute_total(tenant, order_id).await?;
        Ok(discount)
    }

    /// `OPEN|CONFIRMED -> VOIDED`. Voiding an order that was never confirmed
    /// never required a permission; voiding one the kitchen has already
    /// seen ("after subtotal") requires [`Permission::VoidAfterSubtotal`],
    /// same as voiding an individual confirmed line. Existing lines,
    /// consumptions and discounts are left untouched — only the order's own
    /// status changes, so the audit trail of what was actually ordered
    /// survives the void. If the order was the table's last non-terminal
    /// occupant, the table is freed back to `AVAILABLE`.
    pub async fn void_order(
        &self,
        tenant: &str,
        role: Role,
        order_id: &str,
        reason: String,
    ) -> Result<Order, AppError> {
        if reason.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::ReasonRequired,
                "a void reason is required",
            ));
        }
        let order = self.get_order(tenant, order_id).await?;
        if !matches!(order.status, OrderStatus::Open | OrderStatus::Confirmed) {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "only an open or confirmed order can be voided",
            ));
        }
        if order.status == OrderStatus::Confirmed && !role_has_permission(role, Permission::VoidAfterSubtotal) {
            return Err(AppError::permission_denied(
                "voiding a confirmed order requires VOID_AFTER_SUBTOTAL",
            ));
        }
        let voided = self.orders.void(tenant, order_id, order.version).await?;

        if let Some(table_id) = &voided.table_id
            && self
                .orders
                .find_non_terminal_for_table(tenant, table_id)
                .await?
                .is_empty()
            && let Some(table) = self.tables.find_by_id(tenant, table_id).await?
            && table.status == TableStatus::Occupied
        {
            self.tables
                .transition(tenant, table_id, TableStatus::Available, table.version)
                .await?;
        }
        Ok(voided)
    }

    /// `PAID -> CLOSED`. The terminal step of the happy path, separate from
    /// payment completion so a till can review a paid order before closing
    /// it out (printing a final receipt, reconciling a split, etc.).
    pub async fn close(&self, tenant: &str, order_id: &str) -> Result<Order, AppError> {
        let order = self.get_order(tenant, order_id).await?;
        if order.status != OrderStatus::Paid {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "only a fully paid order can be closed",
            ));
        }
        Ok(self
            .orders
            .set_status(tenant, order_id, OrderStatus::Closed, order.version)
            .await?)
    }

    /// Reassigns a single order to a different table, independent of any
    /// other order that may also be sitting on the source table. The
    /// destination must be `AVAILABLE` or already `OCCUPIED`, and neither
    /// table may be blacklisted.
    pub async fn transfer_order(
        &self,
        tenant: &str,
        order_id: &str,
        to_table_id: &str,
    ) -> Result<Order, AppError> {
        let order = self.get_order(tenant, order_id).await?;
        if !matches!(order.status, OrderStatus::Open | OrderStatus::Confirmed) {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "only an open or confirmed order can be transferred",
            ));
        }
        let to = self
            .tables
            .find_by_id(tenant, to_table_id)
            .await?
            .ok_or_else(|| AppError::not_found("table"))?;
        if !matches!(to.status, TableStatus::Available | TableStatus::Occupied) {
            return Err(AppError::with_message(
                ErrorCode::TransferTargetOccupied,
                "target table cannot receive a transfer in its current state",
            ));
        }
        if self
            .blacklist
            .is_blacklisted(tenant, BlacklistEntityType::Table, &to.table_number)
            .await?
        {
            return Err(AppError::with_message(
                ErrorCode::TransferTargetBlacklisted,
                "target table is blacklisted",
            ));
        }
        if to.status == TableStatus::Available {
            self.tables
                .transition(tenant, to_table_id, TableStatus::Occupied, to.version)
                .await?;
        }
        self.orders
            .set_table(tenant, order_id, Some(to_table_id.to_string()))
            .await?;
        self.get_order(tenant, order_id).await
    }
}
