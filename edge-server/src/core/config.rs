//! Server configuration, loaded from the process environment.
//!
//! `main.rs` loads a local `.env` via `dotenvy` before anything else reads
//! these variables; [`Config::from_env`] itself only reads `std::env`.

use crate::auth::JwtConfig;

/// All configuration for one edge node.
///
/// | env var | default | meaning |
/// |---|---|---|
/// | `WORK_DIR` | `/var/lib/pos/edge` | data directory (RocksDB files, JWT secret, audit LOCK file) |
/// | `HTTP_PORT` | `3000` | HTTP API port |
/// | `DATABASE_PATH` | `<WORK_DIR>/db` | RocksDB data path passed to `DbService::new` |
/// | `ENVIRONMENT` | `development` | `development` \| `staging` \| `production` |
/// | `JWT_*` | see [`JwtConfig`] | access/refresh token lifetime, issuer, audience |
/// | `REQUEST_TIMEOUT_MS` | `30000` | per-request timeout enforced by `tower::timeout` |
/// | `PAYMENT_TERMINAL_TIMEOUT_MS` | `15000` | timeout for a `PaymentTerminal::charge`/`refund` call |
/// | `PRINT_TRANSMIT_TIMEOUT_MS` | `5000` | timeout for handing a rendered ticket to `crab-printer` |
/// | `RATE_LIMIT_PER_MINUTE` | `600` | per-tenant request budget enforced at the API boundary |
/// | `LOG_LEVEL` | `info` | `tracing` max level |
/// | `LOG_JSON` | `false` | emit structured JSON logs instead of the human-readable format |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub database_path: String,
    pub jwt: JwtConfig,
    pub environment: String,

    pub request_timeout_ms: u64,
    pub payment_terminal_timeout_ms: u64,
    pub print_transmit_timeout_ms: u64,
    pub rate_limit_per_minute: u32,

    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/pos/edge".to_string());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{work_dir}/db"));

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path,
            jwt: JwtConfig {
                secret: crate::auth::jwt::load_or_create_persistent_secret(
                    std::path::Path::new(&work_dir),
                ),
                ..JwtConfig::default()
            },
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30_000),
            payment_terminal_timeout_ms: std::env::var("PAYMENT_TERMINAL_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15_000),
            print_transmit_timeout_ms: std::env::var("PRINT_TRANSMIT_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5_000),
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(600),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            work_dir,
        }
    }

    /// Override selected fields. Used by integration tests to point at a
    /// temporary data directory and an ephemeral port.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/db", config.work_dir);
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
