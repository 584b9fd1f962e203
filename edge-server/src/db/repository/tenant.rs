//! Tenant and site repositories.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{Site, SiteCreate, Tenant, TenantCreate, TenantStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct TenantRepository {
    base: BaseRepository,
}

impl TenantRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: TenantCreate) -> RepoResult<Tenant> {
        let tenant = Tenant {
            id: None,
            name: data.name,
            plan: data.plan,
            status: TenantStatus::Active,
        };
        let created: Option<Tenant> = self.base.db().create("tenant").content(tenant).await?;
        created.ok_or_else(|| RepoError::Database("failed to create tenant".into()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Tenant>> {
        let thing = make_thing("tenant", id);
        Ok(self.base.db().select(thing).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tenant>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM tenant WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let rows: Vec<Tenant> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn is_active(&self, id: &str) -> RepoResult<bool> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|t| matches!(t.status, TenantStatus::Active))
            .unwrap_or(false))
    }
}

#[derive(Clone)]
pub struct SiteRepository {
    base: BaseRepository,
}

impl SiteRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, tenant: &str, data: SiteCreate) -> RepoResult<Site> {
        if self.find_by_name(tenant, &data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "site '{}' already exists for this tenant",
                data.name
            )));
        }
        let site = Site {
            id: None,
            tenant: tenant.to_string(),
            name: data.name,
            timezone: data.timezone,
        };
        let created: Option<Site> = self.base.db().create("site").content(site).await?;
        created.ok_or_else(|| RepoError::Database("failed to create site".into()))
    }

    pub async fn find_by_id(&self, tenant: &str, id: &str) -> RepoResult<Option<Site>> {
        let thing = make_thing("site", id);
        let site: Option<Site> = self.base.db().select(thing).await?;
        Ok(site.filter(|s| s.tenant == tenant))
    }

    pub async fn find_by_name(&self, tenant: &str, name: &str) -> RepoResult<Option<Site>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM site WHERE tenant = $tenant AND name = $name LIMIT 1")
            .bind(("tenant", tenant.to_string()))
            .bind(("name", name.to_string()))
            .await?;
        let rows: Vec<Site> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_all(&self, tenant: &str) -> RepoResult<Vec<Site>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM site WHERE tenant = $tenant ORDER BY name")
            .bind(("tenant", tenant.to_string()))
            .await?;
        Ok(result.take(0)?)
    }
}
