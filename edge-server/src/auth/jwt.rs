//! JWT token issuance and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::permissions::Permission;
use crate::db::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_expiration_minutes: i64,
    pub refresh_expiration_days: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            access_expiration_minutes: std::env::var("JWT_ACCESS_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            refresh_expiration_days: std::env::var("JWT_REFRESH_EXPIRATION_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "edge-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "edge-clients".to_string()),
        }
    }
}

/// Claims carried in every access token. `tenant_id` is `None` only for
/// `SUPER_ADMIN` tokens — handlers treat its absence as "operates across
/// every tenant", never as "operates on no tenant".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub tenant_id: Option<String>,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    ExpiredToken,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

fn generate_secure_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";
    let rng = SystemRandom::new();
    let mut key = String::new();
    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "CrabEdgeServerDevelopmentSecureKey2024!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.chars().nth(idx).expect("idx is bounded by modulo"));
    }
    key
}

fn load_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            tracing::warn!("JWT_SECRET is shorter than 32 chars, ignoring it");
            generate_secure_printable_jwt_secret()
        }
        Err(_) => {
            tracing::warn!("JWT_SECRET not set, generating an ephemeral development key");
            generate_secure_printable_jwt_secret()
        }
    }
}

/// Load a persistent secret from `<data_dir>/jwt_secret`, generating and
/// writing one on first run so tokens survive a restart.
pub fn load_or_create_persistent_secret(data_dir: &std::path::Path) -> String {
    let secret_path = data_dir.join("jwt_secret");
    if let Ok(secret) = std::fs::read_to_string(&secret_path) {
        let secret = secret.trim().to_string();
        if secret.len() >= 32 {
            return secret;
        }
    }
    let secret = generate_secure_printable_jwt_secret();
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        tracing::error!("failed to create data dir for JWT secret: {e}");
        return secret;
    }
    if let Err(e) = std::fs::write(&secret_path, &secret) {
        tracing::error!("failed to persist JWT secret: {e}");
    } else {
        tracing::info!("JWT secret generated and persisted");
    }
    secret
}

#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: &str,
        username: &str,
        tenant_id: Option<&str>,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.access_expiration_minutes);
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            tenant_id: tenant_id.map(str::to_string),
            role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(token_data.claims)
    }

    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    pub fn refresh_expiration_millis(&self) -> i64 {
        Duration::days(self.config.refresh_expiration_days).num_milliseconds()
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context, built from validated JWT claims and injected into
/// protected handlers via the auth extractor/middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub tenant_id: Option<String>,
    pub role: Role,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.sub,
            username: claims.username,
            tenant_id: claims.tenant_id,
            role: claims.role,
        })
    }
}

impl CurrentUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        crate::auth::permissions::role_has_permission(self.role, permission)
    }

    /// Resolves the tenant a request operates on: the caller's own tenant,
    /// or — for a `SUPER_ADMIN` only — an explicit override (e.g. the
    /// `X-Tenant-ID` header) when one is supplied.
    pub fn effective_tenant<'a>(&'a self, override_tenant: Option<&'a str>) -> Option<&'a str> {
        if self.is_super_admin() {
            override_tenant
        } else {
            self.tenant_id.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_and_validates_a_token() {
        let service = JwtService::with_config(JwtConfig {
            secret: "a-32-byte-or-longer-test-secret!".to_string(),
            ..JwtConfig::default()
        });
        let token = service
            .generate_access_token("user:1", "alice", Some("tenant:1"), Role::Manager)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.tenant_id.as_deref(), Some("tenant:1"));
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn super_admin_has_no_tenant_claim() {
        let service = JwtService::with_config(JwtConfig {
            secret: "a-32-byte-or-longer-test-secret!".to_string(),
            ..JwtConfig::default()
        });
        let token = service
            .generate_access_token("user:1", "root", None, Role::SuperAdmin)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert!(claims.tenant_id.is_none());
    }
}
