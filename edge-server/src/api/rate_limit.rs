//! Per-tenant request-rate limiting.
//!
//! Process-local fixed-window counters guarded by a concurrent map, per the
//! "rate-limiting uses process-local state guarded by a mutex" resource
//! policy — each instance enforces its own budget independently, which is
//! acceptable since every operation this gates has its own authoritative
//! uniqueness/version check underneath.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::error::{AppError, ErrorCode};

const WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started_at: Instant,
    count: u32,
}

pub struct RateLimiter {
    per_minute: u32,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(per_minute: u32) -> Arc<Self> {
        Arc::new(Self {
            per_minute,
            windows: DashMap::new(),
        })
    }

    /// Returns `true` if `key` is still within budget for the current
    /// window, incrementing its counter as a side effect.
    fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started_at: now,
                count: 0,
            });
        if now.duration_since(entry.started_at) >= WINDOW {
            entry.started_at = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.per_minute
    }
}

/// Keyed by tenant when authenticated, else by nothing narrower than the
/// whole process — the public auth endpoints this would otherwise leave
/// uncovered are low-volume and already protected by Argon2's cost.
pub async fn enforce(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = req
        .extensions()
        .get::<CurrentUser>()
        .and_then(|u| u.tenant_id.clone())
        .unwrap_or_else(|| "__unauthenticated__".to_string());

    if !state.rate_limiter.check(&key) {
        return Err(AppError::with_message(
            ErrorCode::RateLimitExceeded,
            "rate limit exceeded for this tenant",
        ));
    }
    Ok(next.run(req).await)
}
