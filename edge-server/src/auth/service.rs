//! Login/refresh/logout orchestration: verifies credentials, issues the
//! access/refresh token pair, and rotates/revokes refresh tokens.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::AppError;
use crate::auth::JwtService;
use crate::db::models::{Role, User};
use crate::db::repository::{RefreshTokenRepository, UserRepository};
use shared::util::now_millis;

fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_refresh_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user_id: String,
    pub username: String,
    pub tenant_id: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// `None` for `SUPER_ADMIN`, whose username is looked up globally.
    pub tenant_id: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    refresh_tokens: RefreshTokenRepository,
    jwt: std::sync::Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        refresh_tokens: RefreshTokenRepository,
        jwt: std::sync::Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self
            .users
            .find_by_username(request.tenant_id.as_deref(), &request.username)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::invalid_credentials())?;

        if !user.is_active() {
            return Err(AppError::invalid("Account is inactive"));
        }

        let verified = user
            .verify_password(&request.password)
            .map_err(|_| AppError::invalid_credentials())?;
        if !verified {
            return Err(AppError::invalid_credentials());
        }

        self.issue_tokens(&user).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<LoginResponse, AppError> {
        let token_hash = hash_refresh_token(refresh_token);
        let stored = self
            .refresh_tokens
            .find_by_hash(&token_hash)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::invalid_token("Unknown refresh token"))?;

        if !RefreshTokenRepository::is_valid(&stored) {
            return Err(AppError::token_expired());
        }

        let user = self
            .users
            .find_by_id(&stored.user_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::invalid_token("User no longer exists"))?;
        if !user.is_active() {
            return Err(AppError::invalid("Account is inactive"));
        }

        // Rotate: revoke the presented token before minting a new pair.
        self.refresh_tokens
            .revoke(&token_hash)
            .await
            .map_err(AppError::from)?;

        self.issue_tokens(&user).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let token_hash = hash_refresh_token(refresh_token);
        self.refresh_tokens
            .revoke(&token_hash)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn issue_tokens(&self, user: &User) -> Result<LoginResponse, AppError> {
        let user_id = user
            .id
            .as_ref()
            .ok_or_else(|| AppError::internal("user has no id"))?
            .to_string();

        let access_token = self
            .jwt
            .generate_access_token(&user_id, &user.username, user.tenant.as_deref(), user.role)
            .map_err(|e| AppError::internal(format!("failed to generate access token: {e}")))?;

        let refresh_token = generate_refresh_token();
        let refresh_hash = hash_refresh_token(&refresh_token);
        let expires_at = now_millis() + self.jwt.refresh_expiration_millis();
        self.refresh_tokens
            .store(user.tenant.as_deref(), &user_id, &refresh_hash, expires_at)
            .await
            .map_err(AppError::from)?;

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.jwt.config.access_expiration_minutes * 60,
            user_id,
            username: user.username.clone(),
            tenant_id: user.tenant.clone(),
            role: user.role,
        })
    }
}
