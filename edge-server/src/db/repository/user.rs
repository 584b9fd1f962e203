//! User and refresh-token repositories.
//!
//! Username uniqueness is conditional:
//! globally unique among `SUPER_ADMIN` users (whose `tenant` is `None`),
//! unique within `tenant` otherwise. The schema-level unique index is on
//! `(tenant, username)` only; the super-admin case is checked explicitly
//! here because `tenant` being absent means the index can't enforce it.

use super::{BaseRepository, RepoError, RepoResult, make_thing};
use crate::db::models::{RefreshToken, Role, User, UserCreate, UserUpdate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if data.role == Role::SuperAdmin && data.tenant.is_some() {
            return Err(RepoError::Validation(
                "SUPER_ADMIN users have no tenant".into(),
            ));
        }
        if data.role != Role::SuperAdmin && data.tenant.is_none() {
            return Err(RepoError::Validation(
                "tenant-scoped users require a tenant".into(),
            ));
        }

        if self
            .find_by_username(data.tenant.as_deref(), &data.username)
            .await?
            .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "username '{}' already exists",
                data.username
            )));
        }

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Validation(format!("failed to hash password: {e}")))?;

        let user = User {
            id: None,
            tenant: data.tenant,
            username: data.username,
            password_hash,
            role: data.role,
            status: crate::db::models::UserStatus::Active,
        };
        let created: Option<User> = self.base.db().create("user").content(user).await?;
        created.ok_or_else(|| RepoError::Database("failed to create user".into()))
    }

    /// `tenant = None` means "search among super-admins"; otherwise scoped
    /// to the given tenant.
    pub async fn find_by_username(
        &self,
        tenant: Option<&str>,
        username: &str,
    ) -> RepoResult<Option<User>> {
        let mut result = match tenant {
            Some(t) => {
                self.base
                    .db()
                    .query("SELECT * FROM user WHERE tenant = $tenant AND username = $username LIMIT 1")
                    .bind(("tenant", t.to_string()))
                    .bind(("username", username.to_string()))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM user WHERE tenant = NONE AND username = $username LIMIT 1")
                    .bind(("username", username.to_string()))
                    .await?
            }
        };
        let rows: Vec<User> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = make_thing("user", id);
        Ok(self.base.db().select(thing).await?)
    }

    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("user {id} not found")))?;
        let role = data.role.unwrap_or(existing.role);
        let status = data.status.unwrap_or(existing.status);

        let thing = make_thing("user", id);
        self.base
            .db()
            .query("UPDATE $thing SET role = $role, status = $status")
            .bind(("thing", thing))
            .bind(("role", role))
            .bind(("status", status))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("user {id} not found")))
    }
}

#[derive(Clone)]
pub struct RefreshTokenRepository {
    base: BaseRepository,
}

impl RefreshTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn store(
        &self,
        tenant: Option<&str>,
        user_id: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> RepoResult<RefreshToken> {
        let row = RefreshToken {
            id: None,
            tenant: tenant.map(str::to_string),
            user_id: user_id.to_string(),
            token_hash: token_hash.to_string(),
            expires_at,
            revoked: false,
        };
        let created: Option<RefreshToken> =
            self.base.db().create("refresh_token").content(row).await?;
        created.ok_or_else(|| RepoError::Database("failed to store refresh token".into()))
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM refresh_token WHERE token_hash = $hash LIMIT 1")
            .bind(("hash", token_hash.to_string()))
            .await?;
        let rows: Vec<RefreshToken> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Valid iff not revoked and not expired.
    pub fn is_valid(token: &RefreshToken) -> bool {
        !token.revoked && token.expires_at > now_millis()
    }

    pub async fn revoke(&self, token_hash: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE refresh_token SET revoked = true WHERE token_hash = $hash")
            .bind(("hash", token_hash.to_string()))
            .await?;
        Ok(())
    }
}
