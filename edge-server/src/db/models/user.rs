//! User (staff member) model.
//!
//! Tenant-scoped except for `SUPER_ADMIN`, whose `tenant` is absent and
//! whose `username` is unique globally rather than per-tenant.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Cashier,
    Waiter,
    KitchenStaff,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Cashier => "CASHIER",
            Role::Waiter => "WAITER",
            Role::KitchenStaff => "KITCHEN_STAFF",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<RecordId>,
    /// Absent for `SUPER_ADMIN`; present for every tenant-scoped user.
    pub tenant: Option<String>,
    pub username: String,
    /// Argon2 password hash (`User::hash_password`/`verify_password`).
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

impl User {
    pub fn is_active(&self) -> bool {
        matches!(self.status, UserStatus::Active)
    }

    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };
        let parsed = PasswordHash::new(&self.password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub tenant: Option<String>,
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

/// Response shape that never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub tenant: Option<String>,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.map(|t| t.to_string()).unwrap_or_default(),
            tenant: u.tenant,
            username: u.username,
            role: u.role,
            status: u.status,
        }
    }
}

/// Hash of a refresh token — only the hash is ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Option<RecordId>,
    pub tenant: Option<String>,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: i64,
    pub revoked: bool,
}
