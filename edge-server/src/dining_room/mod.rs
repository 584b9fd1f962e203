//! Dining room — table lifecycle and the cross-cutting blacklist.
//!
//! `AVAILABLE` <-> `OCCUPIED` is driven by [`DiningRoomService::open`] and
//! [`DiningRoomService::close`]; reservations ([`TableStatus::Reserved`])
//! are modeled in the data but no transition operation is built for them —
//! the lifecycle around them was never fully specified and is treated as
//! out of scope here. `BLOCKED` is reachable from, and returns to,
//! `AVAILABLE` only, through direct manager action.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};

use crate::db::models::{BlacklistEntityType, BlacklistEntry, DiningTable, DiningTableCreate, TableStatus};
use crate::db::repository::{BlacklistRepository, DiningTableRepository, OrderRepository};

#[derive(Clone)]
pub struct DiningRoomService {
    tables: DiningTableRepository,
    blacklist: BlacklistRepository,
    orders: OrderRepository,
}

impl DiningRoomService {
    pub fn new(
        tables: DiningTableRepository,
        blacklist: BlacklistRepository,
        orders: OrderRepository,
    ) -> Arc<Self> {
        Arc::new(Self {
            tables,
            blacklist,
            orders,
        })
    }

    async fn get_table(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        self.tables
            .find_by_id(tenant, table_id)
            .await?
            .ok_or_else(|| AppError::not_found("table"))
    }

    pub async fn get(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        self.get_table(tenant, table_id).await
    }

    pub async fn create_table(&self, tenant: &str, data: DiningTableCreate) -> Result<DiningTable, AppError> {
        Ok(self.tables.create(tenant, data).await?)
    }

    pub async fn list_tables(&self, tenant: &str, site: &str) -> Result<Vec<DiningTable>, AppError> {
        Ok(self.tables.find_all(tenant, site).await?)
    }

    pub async fn add_to_blacklist(
        &self,
        tenant: &str,
        entity_type: BlacklistEntityType,
        entity_value: &str,
        reason: Option<String>,
    ) -> Result<BlacklistEntry, AppError> {
        Ok(self.blacklist.add(tenant, entity_type, entity_value, reason).await?)
    }

    pub async fn remove_from_blacklist(
        &self,
        tenant: &str,
        entity_type: BlacklistEntityType,
        entity_value: &str,
    ) -> Result<(), AppError> {
        Ok(self.blacklist.remove(tenant, entity_type, entity_value).await?)
    }

    async fn is_blacklisted(&self, tenant: &str, table_number: &str) -> Result<bool, AppError> {
        Ok(self
            .blacklist
            .is_blacklisted(tenant, BlacklistEntityType::Table, table_number)
            .await?)
    }

    /// `AVAILABLE -> OCCUPIED`. Requires the table to be available and not
    /// blacklisted; fails atomically on either condition.
    pub async fn open(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        let table = self.get_table(tenant, table_id).await?;
        if table.status != TableStatus::Available {
            return Err(AppError::with_message(
                ErrorCode::TableOccupied,
                "table is not available",
            ));
        }
        if self.is_blacklisted(tenant, &table.table_number).await? {
            return Err(AppError::with_message(
                ErrorCode::TableBlacklisted,
                "table is blacklisted",
            ));
        }
        Ok(self
            .tables
            .transition(tenant, table_id, TableStatus::Occupied, table.version)
            .await?)
    }

    /// `OCCUPIED -> AVAILABLE`. Requires every order still attached to the
    /// table to be in a terminal state (`PAID`, `CLOSED` or `VOIDED`).
    pub async fn close(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        let table = self.get_table(tenant, table_id).await?;
        if table.status != TableStatus::Occupied {
            return Err(AppError::with_message(
                ErrorCode::TableNotOccupied,
                "table is not occupied",
            ));
        }
        if !self
            .orders
            .find_non_terminal_for_table(tenant, table_id)
            .await?
            .is_empty()
        {
            return Err(AppError::with_message(
                ErrorCode::OrderNotOpen,
                "table still has a non-terminal order",
            ));
        }
        Ok(self
            .tables
            .transition(tenant, table_id, TableStatus::Available, table.version)
            .await?)
    }

    /// Manual `AVAILABLE -> BLOCKED`. A table taken out of service (broken
    /// furniture, reserved for a private event) can be blocked regardless of
    /// whether it currently holds an open order — blocking doesn't touch the
    /// order, it only prevents the table from being opened again once free.
    pub async fn block(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        let table = self.get_table(tenant, table_id).await?;
        if table.status == TableStatus::Blocked {
            return Err(AppError::with_message(
                ErrorCode::TableAlreadyBlocked,
                "table is already blocked",
            ));
        }
        Ok(self
            .tables
            .transition(tenant, table_id, TableStatus::Blocked, table.version)
            .await?)
    }

    /// `BLOCKED -> AVAILABLE`, the only transition out of `BLOCKED`.
    pub async fn unblock(&self, tenant: &str, table_id: &str) -> Result<DiningTable, AppError> {
        let table = self.get_table(tenant, table_id).await?;
        if table.status != TableStatus::Blocked {
            return Err(AppError::with_message(
                ErrorCode::TableNotBlocked,
                "table is not blocked",
            ));
        }
        Ok(self
            .tables
            .transition(tenant, table_id, TableStatus::Available, table.version)
            .await?)
    }

    /// Reassigns every open order on `from` to `to` in one logical step,
    /// recomputing both tables' statuses. Fails atomically — no order moves —
    /// if `to` is neither `AVAILABLE` nor `OCCUPIED`, or if either table is
    /// blacklisted.
    pub async fn transfer(
        &self,
        tenant: &str,
        from_table_id: &str,
        to_table_id: &str,
    ) -> Result<(), AppError> {
        let from = self.get_table(tenant, from_table_id).await?;
        let to = self.get_table(tenant, to_table_id).await?;

        if !matches!(to.status, TableStatus::Available | TableStatus::Occupied) {
            return Err(AppError::with_message(
                ErrorCode::TransferTargetOccupied,
                "target table cannot receive a transfer in its current state",
            ));
        }
        if self.is_blacklisted(tenant, &from.table_number).await?
            || self.is_blacklisted(tenant, &to.table_number).await?
        {
            return Err(AppError::with_message(
                ErrorCode::TransferTargetBlacklisted,
                "a table in this transfer is blacklisted",
            ));
        }

        let orders_on_from = self.orders.find_non_terminal_for_table(tenant, from_table_id).await?;
        let occupy_to = to.status == TableStatus::Available && !orders_on_from.is_empty();
        let free_from = from.status == TableStatus::Occupied;

        // Moving the orders and flipping both tables' statuses commit as a
        // single SurrealQL transaction (see `DiningTableRepository::transfer_transactional`)
        // so the table graph is never observed half-transferred.
        self.tables
            .transfer_transactional(tenant, from_table_id, to_table_id, from.version, to.version, occupy_to, free_from)
            .await?;
        Ok(())
    }
}
