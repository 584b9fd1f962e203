//! Minimal catalog read/write surface.
//!
//! The menu-catalog CRUD proper (pricing rules, categories, images, labels)
//! is an external collaborator; this repository only carries enough of the
//! Family → Subfamily → Item hierarchy for the order core to resolve an
//! item id into an [`ItemSnapshot`] at `add_line` time.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{Family, Item, ItemSnapshot, Subfamily};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CatalogRepository {
    base: BaseRepository,
}

impl CatalogRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create_family(&self, tenant: &str, name: &str) -> RepoResult<Family> {
        let family = Family {
            id: None,
            tenant: tenant.to_string(),
            name: name.to_string(),
        };
        let created: Option<Family> = self.base.db().create("family").content(family).await?;
        created.ok_or_else(|| RepoError::Database("failed to create family".into()))
    }

    pub async fn create_subfamily(
        &self,
        tenant: &str,
        family: &str,
        name: &str,
    ) -> RepoResult<Subfamily> {
        let subfamily = Subfamily {
            id: None,
            tenant: tenant.to_string(),
            family: family.to_string(),
            name: name.to_string(),
        };
        let created: Option<Subfamily> =
            self.base.db().create("subfamily").content(subfamily).await?;
        created.ok_or_else(|| RepoError::Database("failed to create subfamily".into()))
    }

    pub async fn create_item(&self, item: Item) -> RepoResult<Item> {
        let created: Option<Item> = self.base.db().create("item").content(item).await?;
        created.ok_or_else(|| RepoError::Database("failed to create item".into()))
    }

    pub async fn find_item(&self, tenant: &str, id: &str) -> RepoResult<Option<Item>> {
        let thing = make_thing("item", id);
        let item: Option<Item> = self.base.db().select(thing).await?;
        Ok(item.filter(|i| i.tenant == tenant))
    }

    /// Resolve an item id into the immutable snapshot an order line captures.
    /// Fails if the item doesn't exist, belongs to another tenant, or is
    /// marked unavailable.
    pub async fn snapshot(&self, tenant: &str, item_id: &str) -> RepoResult<ItemSnapshot> {
        let item = self
            .find_item(tenant, item_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("item {item_id} not found")))?;
        if !item.available {
            return Err(RepoError::Validation(format!(
                "item {item_id} is not available"
            )));
        }
        Ok(ItemSnapshot::from(item))
    }

    pub async fn find_all_items(&self, tenant: &str) -> RepoResult<Vec<Item>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM item WHERE tenant = $tenant ORDER BY name")
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn set_availability(
        &self,
        tenant: &str,
        item_id: &str,
        available: bool,
    ) -> RepoResult<()> {
        let thing = make_thing("item", item_id);
        self.base
            .db()
            .query("UPDATE $thing SET available = $available WHERE tenant = $tenant")
            .bind(("thing", thing))
            .bind(("available", available))
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(())
    }
}
