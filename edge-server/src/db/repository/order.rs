//! Order, order line, consumption and discount repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{
    Consumption, Discount, DiscountTarget, DiscountType, Order, OrderLine, OrderLineStatus,
    OrderStatus, OrderType,
};
use shared::Money;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        tenant: &str,
        site: &str,
        order_type: OrderType,
        table_id: Option<String>,
        customer_id: Option<String>,
    ) -> RepoResult<Order> {
        let order = Order {
            id: None,
            tenant: tenant.to_string(),
            site: site.to_string(),
            order_type,
            table_id,
            customer_id,
            status: OrderStatus::Open,
            total_amount: Money::ZERO,
            notes: None,
            version: 0,
            created_at: now_millis(),
        };
        let created: Option<Order> = self.base.db().create("order_").content(order).await?;
        created.ok_or_else(|| RepoError::Database("failed to create order".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<Order>> {
        let thing = make_thing("order_", id);
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order.filter(|o| o.tenant == tenant))
    }

    /// Every non-terminal (`OPEN`/`CONFIRMED`) order currently attached to a
    /// table. A table can carry more than one — nothing in `OrderService::create`
    /// rejects a second order against an already-`OCCUPIED` table — so callers
    /// that need "is this table fully free" or "move every order off this
    /// table" must consider the whole set, not just the first match.
    pub async fn find_non_terminal_for_table(&self, tenant: &str, table_id: &str) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM order_ WHERE tenant = $tenant AND table_id = $table_id \
                 AND status IN ['OPEN', 'CONFIRMED']",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("table_id", table_id.to_string()))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows)
    }

    /// Recompute and persist `total_amount` from the order's current lines
    /// and discounts. Called after every mutating line/discount operation.
    pub async fn recompute_total(&self, tenant: &str, order_id: &str) -> RepoResult<Order> {
        let lines = self.lines_repo().find_by_order(tenant, order_id).await?;
        let discounts = self.discount_repo().find_by_order(tenant, order_id).await?;

        let mut total: Money = lines
            .iter()
            .filter(|l| l.contributes_to_total())
            .map(|l| l.line_total())
            .sum();

        for discount in &discounts {
            total = total
                .checked_sub(discount.computed_amount)
                .unwrap_or(Money::ZERO);
        }
        if total.is_negative() {
            total = Money::ZERO;
        }

        let thing = make_thing("order_", order_id);
        self.base
            .db()
            .query("UPDATE $thing SET total_amount = $total, version = version + 1")
            .bind(("thing", thing))
            .bind(("total", total))
            .await?;

        self.find_by_id(tenant, order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("order {order_id} not found")))
    }

    pub async fn set_status(
        &self,
        tenant: &str,
        order_id: &str,
        status: OrderStatus,
        expected_version: i64,
    ) -> RepoResult<Order> {
        let thing = make_thing("order_", order_id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("status", status))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!("order {order_id} was modified concurrently"))
        })
    }

    /// Confirms every `PENDING` line and advances the order to `CONFIRMED`
    /// as one SurrealQL transaction, so a connection drop between the two
    /// writes can never leave lines `CONFIRMED` against a still-`OPEN` order.
    /// The line update's `WHERE` clause is gated on the order write's result
    /// (`array::len($order) > 0`), so a version conflict on the order leaves
    /// the lines untouched too, even though no statement itself errors.
    pub async fn confirm_transactional(
        &self,
        tenant: &str,
        order_id: &str,
        expected_version: i64,
    ) -> RepoResult<(Vec<OrderLine>, Order)> {
        let thing = make_thing("order_", order_id);
        let mut result = self
            .base
            .db()
            .query("BEGIN TRANSACTION;")
            .query(
                "LET $order = (UPDATE $thing SET status = 'CONFIRMED', version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER);",
            )
            .query(
                "UPDATE order_line SET status = 'CONFIRMED', version = version + 1 \
                 WHERE tenant = $tenant AND order_id = $order_id AND status = 'PENDING' \
                 AND array::len($order) > 0 RETURN AFTER;",
            )
            .query("RETURN $order;")
            .query("COMMIT TRANSACTION;")
            .bind(("thing", thing))
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let lines: Vec<OrderLine> = result.take(2)?;
        let orders: Vec<Order> = result.take(3)?;
        let order = orders.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!("order {order_id} was modified concurrently"))
        })?;
        Ok((lines, order))
    }

    /// `OPEN|CONFIRMED -> VOIDED`. Unlike [`Self::set_status`], the caller
    /// doesn't need to know which of the two source states the order is in —
    /// the query itself constrains it, so a payment-in-flight race (order
    /// already `PAID`) is rejected as a stale version rather than silently
    /// voiding a paid order.
    pub async fn void(
        &self,
        tenant: &str,
        order_id: &str,
        expected_version: i64,
    ) -> RepoResult<Order> {
        let thing = make_thing("order_", order_id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'VOIDED', version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected \
                 AND status IN ['OPEN', 'CONFIRMED'] RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!("order {order_id} was modified concurrently"))
        })
    }

    pub async fn set_table(&self, tenant: &str, order_id: &str, table_id: Option<String>) -> RepoResult<()> {
        let thing = make_thing("order_", order_id);
        self.base
            .db()
            .query("UPDATE $thing SET table_id = $table_id, version = version + 1 WHERE tenant = $tenant")
            .bind(("thing", thing))
            .bind(("table_id", table_id))
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(())
    }

    /// Newest-first order history for a customer, across sites.
    pub async fn find_by_customer(&self, tenant: &str, customer_id: &str) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM order_ WHERE tenant = $tenant AND customer_id = $customer_id \
                 ORDER BY created_at DESC",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("customer_id", customer_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub fn lines_repo(&self) -> OrderLineRepository {
        OrderLineRepository::new(self.base.db().clone())
    }

    pub fn discount_repo(&self) -> DiscountRepository {
        DiscountRepository::new(self.base.db().clone())
    }

    pub fn consumption_repo(&self) -> ConsumptionRepository {
        ConsumptionRepository::new(self.base.db().clone())
    }
}

#[derive(Clone)]
pub struct OrderLineRepository {
    base: BaseRepository,
}

impl OrderLineRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add(
        &self,
        tenant: &str,
        order_id: &str,
        item_id: &str,
        item_name: &str,
        print_zone: &str,
        quantity: i32,
        unit_price: Money,
        modifiers: Vec<String>,
        notes: Option<String>,
    ) -> RepoResult<OrderLine> {
        if quantity <= 0 {
            return Err(RepoError::Validation("quantity must be positive".into()));
        }
        let line = OrderLine {
            id: None,
            tenant: tenant.to_string(),
            order_id: order_id.to_string(),
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
            print_zone: print_zone.to_string(),
            quantity,
            unit_price,
            modifiers,
            notes,
            status: OrderLineStatus::Pending,
            version: 0,
            voided_at: None,
        };
        let created: Option<OrderLine> = self.base.db().create("order_line").content(line).await?;
        created.ok_or_else(|| RepoError::Database("failed to add order line".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<OrderLine>> {
        let thing = make_thing("order_line", id);
        let line: Option<OrderLine> = self.base.db().select(thing).await?;
        Ok(line.filter(|l| l.tenant == tenant))
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<OrderLine>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order_line WHERE tenant = $tenant AND order_id = $order_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn update_quantity_notes(
        &self,
        tenant: &str,
        id: &str,
        quantity: Option<i32>,
        notes: Option<String>,
        expected_version: i64,
    ) -> RepoResult<OrderLine> {
        let existing = self
            .find_by_id(tenant, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("order line {id} not found")))?;
        if existing.status != OrderLineStatus::Pending {
            return Err(RepoError::Validation(
                "only PENDING lines may be edited".into(),
            ));
        }
        let new_quantity = quantity.unwrap_or(existing.quantity);
        if new_quantity <= 0 {
            return Err(RepoError::Validation("quantity must be positive".into()));
        }
        let new_notes = notes.or(existing.notes);

        let thing = make_thing("order_line", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET quantity = $quantity, notes = $notes, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("quantity", new_quantity))
            .bind(("notes", new_notes))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<OrderLine> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Validation(format!("order line {id} was modified concurrently")))
    }

    pub async fn void(
        &self,
        tenant: &str,
        id: &str,
        expected_version: i64,
    ) -> RepoResult<OrderLine> {
        let thing = make_thing("order_line", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = 'VOIDED', voided_at = $now, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<OrderLine> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Validation(format!("order line {id} was modified concurrently")))
    }
}

#[derive(Clone)]
pub struct ConsumptionRepository {
    base: BaseRepository,
}

impl ConsumptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn record(&self, tenant: &str, line: &OrderLine) -> RepoResult<Consumption> {
        let consumption = Consumption {
            id: None,
            tenant: tenant.to_string(),
            order_id: line.order_id.clone(),
            line_id: line.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            item_id: line.item_id.clone(),
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            confirmed_at: now_millis(),
            voided_at: None,
        };
        let created: Option<Consumption> =
            self.base.db().create("consumption").content(consumption).await?;
        created.ok_or_else(|| RepoError::Database("failed to record consumption".into()))
    }

    pub async fn mark_voided_for_line(&self, tenant: &str, line_id: &str) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE consumption SET voided_at = $now \
                 WHERE tenant = $tenant AND line_id = $line_id AND voided_at IS NONE",
            )
            .bind(("now", now_millis()))
            .bind(("tenant", tenant.to_string()))
            .bind(("line_id", line_id.to_string()))
            .await?;
        Ok(())
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<Consumption>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM consumption WHERE tenant = $tenant AND order_id = $order_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }
}

#[derive(Clone)]
pub struct DiscountRepository {
    base: BaseRepository,
}

impl DiscountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn apply(
        &self,
        tenant: &str,
        order_id: &str,
        line_id: Option<String>,
        target: DiscountTarget,
        discount_type: DiscountType,
        amount: Money,
        computed_amount: Money,
        reason: String,
        applied_by: String,
    ) -> RepoResult<Discount> {
        let discount = Discount {
            id: None,
            tenant: tenant.to_string(),
            order_id: order_id.to_string(),
            line_id,
            target,
            discount_type,
            amount,
            computed_amount,
            reason,
            applied_by,
            applied_at: now_millis(),
        };
        let created: Option<Discount> = self.base.db().create("discount").content(discount).await?;
        created.ok_or_else(|| RepoError::Database("failed to apply discount".into()))
    }

    pub async fn find_by_order(&self, tenant: &str, order_id: &str) -> RepoResult<Vec<Discount>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM discount WHERE tenant = $tenant AND order_id = $order_id")
            .bind(("tenant", tenant.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }
}
