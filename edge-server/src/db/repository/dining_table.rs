//! Dining table and blacklist repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{
    BlacklistEntityType, BlacklistEntry, DiningTable, DiningTableCreate, TableStatus,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, tenant: &str, data: DiningTableCreate) -> RepoResult<DiningTable> {
        let exists = self
            .find_by_number(tenant, &data.site, &data.table_number)
            .await?
            .is_some();
        if exists {
            return Err(RepoError::Duplicate(format!(
                "table '{}' already exists at this site",
                data.table_number
            )));
        }
        let table = DiningTable {
            id: None,
            tenant: tenant.to_string(),
            site: data.site,
            table_number: data.table_number,
            status: TableStatus::Available,
            version: 0,
        };
        let created: Option<DiningTable> =
            self.base.db().create("dining_table").content(table).await?;
        created.ok_or_else(|| RepoError::Database("failed to create dining table".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing = make_thing("dining_table", id);
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table.filter(|t| t.tenant == tenant))
    }

    pub async fn find_by_number(
        &self,
        tenant: &str,
        site: &str,
        table_number: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table WHERE tenant = $tenant AND site = $site AND table_number = $number LIMIT 1",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .bind(("number", table_number.to_string()))
            .await?;
        let rows: Vec<DiningTable> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_all(&self, tenant: &str, site: &str) -> RepoResult<Vec<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE tenant = $tenant AND site = $site ORDER BY table_number")
            .bind(("tenant", tenant.to_string()))
            .bind(("site", site.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Version-checked status transition. Returns `RepoError::Validation` if
    /// `expected_version` doesn't match the stored row (optimistic conflict).
    pub async fn transition(
        &self,
        tenant: &str,
        id: &str,
        new_status: TableStatus,
        expected_version: i64,
    ) -> RepoResult<DiningTable> {
        let thing = make_thing("dining_table", id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $status, version = version + 1 \
                 WHERE tenant = $tenant AND version = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("status", new_status))
            .bind(("tenant", tenant.to_string()))
            .bind(("expected", expected_version))
            .await?;
        let rows: Vec<DiningTable> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| {
            RepoError::Validation(format!("table {id} was modified concurrently"))
        })
    }

    /// Moves every non-terminal order off `from_table_id` onto
    /// `to_table_id` and flips whichever of the two tables' statuses the
    /// caller determined need flipping, all as one SurrealQL transaction —
    /// a connection drop mid-sequence can otherwise strand a table
    /// `OCCUPIED` with nothing on it, or `AVAILABLE` while still holding an
    /// order. The two status flips are each version-gated the same way
    /// [`Self::transition`] is.
    #[allow(clippy::too_many_arguments)]
    pub async fn transfer_transactional(
        &self,
        tenant: &str,
        from_table_id: &str,
        to_table_id: &str,
        from_version: i64,
        to_version: i64,
        occupy_to: bool,
        free_from: bool,
    ) -> RepoResult<()> {
        let from_thing = make_thing("dining_table", from_table_id);
        let to_thing = make_thing("dining_table", to_table_id);

        let mut stmts = String::from("BEGIN TRANSACTION;");
        stmts.push_str(
            "UPDATE order_ SET table_id = $to_table_id, version = version + 1 \
             WHERE tenant = $tenant AND table_id = $from_table_id AND status IN ['OPEN', 'CONFIRMED'];",
        );
        if occupy_to {
            stmts.push_str(
                "UPDATE $to_thing SET status = 'OCCUPIED', version = version + 1 \
                 WHERE tenant = $tenant AND version = $to_version;",
            );
        }
        if free_from {
            stmts.push_str(
                "UPDATE $from_thing SET status = 'AVAILABLE', version = version + 1 \
                 WHERE tenant = $tenant AND version = $from_version;",
            );
        }
        stmts.push_str("COMMIT TRANSACTION;");

        self.base
            .db()
            .query(stmts)
            .bind(("tenant", tenant.to_string()))
            .bind(("from_table_id", from_table_id.to_string()))
            .bind(("to_table_id", to_table_id.to_string()))
            .bind(("from_thing", from_thing))
            .bind(("to_thing", to_thing))
            .bind(("from_version", from_version))
            .bind(("to_version", to_version))
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct BlacklistRepository {
    base: BaseRepository,
}

impl BlacklistRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn add(
        &self,
        tenant: &str,
        entity_type: BlacklistEntityType,
        entity_value: &str,
        reason: Option<String>,
    ) -> RepoResult<BlacklistEntry> {
        let entry = BlacklistEntry {
            id: None,
            tenant: tenant.to_string(),
            entity_type,
            entity_value: entity_value.to_string(),
            reason,
        };
        let created: Option<BlacklistEntry> =
            self.base.db().create("blacklist_entry").content(entry).await?;
        created.ok_or_else(|| RepoError::Database("failed to add blacklist entry".into()))
    }

    pub async fn is_blacklisted(
        &self,
        tenant: &str,
        entity_type: BlacklistEntityType,
        entity_value: &str,
    ) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM blacklist_entry WHERE tenant = $tenant AND entity_type = $entity_type \
                 AND entity_value = $entity_value LIMIT 1",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("entity_type", entity_type))
            .bind(("entity_value", entity_value.to_string()))
            .await?;
        let rows: Vec<BlacklistEntry> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    pub async fn remove(
        &self,
        tenant: &str,
        entity_type: BlacklistEntityType,
        entity_value: &str,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "DELETE blacklist_entry WHERE tenant = $tenant AND entity_type = $entity_type \
                 AND entity_value = $entity_value",
            )
            .bind(("tenant", tenant.to_string()))
            .bind(("entity_type", entity_type))
            .bind(("entity_value", entity_value.to_string()))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_status_serializes_uppercase() {
        let json = serde_json::to_string(&TableStatus::Occupied).unwrap();
        assert_eq!(json, "\"OCCUPIED\"");
    }
}
