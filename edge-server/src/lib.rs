//! Crab Edge Server — multi-tenant restaurant POS transactional core.
//!
//! # Architecture
//!
//! A single embedded SurrealDB store backs nine cooperating bounded
//! contexts. Services call each other synchronously in-process along the
//! allowed dependency order (tenant/auth -> dining room -> orders ->
//! printing/payments -> cash register); cross-context reactions run off a
//! transactional domain event bus (see [`events`]).
//!
//! # Module structure
//!
//! ```text
//! edge-server/src/
//! ├── core/          # config, server state, HTTP server, startup errors
//! ├── auth/          # JWT issuance, coarse permission matrix, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # SurrealDB models + repositories
//! ├── dining_room/   # table lifecycle + blacklist
//! ├── orders/        # order/line lifecycle, "Pedir", discounts, transfer
//! ├── payments/       # idempotent payments, fiscal numbering, split bill
//! ├── cash/          # session lifecycle, movements, closings
//! ├── printing/       # kitchen ticket rendering + routing dispatch
//! ├── customer/      # phone-indexed lookup, order history
//! ├── audit/         # tamper-evident audit trail
//! ├── events.rs      # transactional domain event bus
//! └── utils/         # errors, logging, time, validation
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod cash;
pub mod core;
pub mod customer;
pub mod db;
pub mod dining_room;
pub mod events;
pub mod orders;
pub mod payments;
pub mod printing;
pub mod reporting;
pub mod utils;

// Re-export commonly used types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use events::{DomainEvent, EventBus};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Queues an entry on [`audit::AuditService`] for asynchronous, tamper-evident
/// persistence.
///
/// ```ignore
/// audit_log!(
///     state.audit,
///     tenant,
///     AuditAction::OrderConfirmed,
///     "order", &order_id,
///     operator_id = Some(user.id.clone()),
///     operator_name = Some(user.username.clone()),
///     details = serde_json::json!({"line_count": lines.len()})
/// );
/// ```
#[macro_export]
macro_rules! audit_log {
    ($service:expr, $tenant:expr, $action:expr, $res_type:expr, $res_id:expr,
     operator_id = $op_id:expr, operator_name = $op_name:expr, details = $details:expr) => {
        $service
            .log($tenant, $action, $res_type, $res_id, $op_id, $op_name, $details)
            .await;
    };
    ($service:expr, $tenant:expr, $action:expr, $res_type:expr, $res_id:expr, details = $details:expr) => {
        $service
            .log($tenant, $action, $res_type, $res_id, None, None, $details)
            .await;
    };
    ($service:expr, $tenant:expr, $action:expr, $res_type:expr, $res_id:expr) => {
        $service
            .log($tenant, $action, $res_type, $res_id, None, None, serde_json::json!({}))
            .await;
    };
}

/// Security-relevant event logging, separate from the domain audit trail
/// (failed logins, permission denials) — goes to `tracing`, not the
/// tamper-evident chain, since it is operational rather than financial.
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ______           __
  / ____/________ _/ /_
 / /   / ___/ __ `/ __ \
/ /___/ /  / /_/ / /_/ /
\____/_/   \__,_/_.___/
    ______    __
   / ____/___/ /___ ____
  / __/ / __  / __ `/ _ \
 / /___/ /_/ / /_/ /  __/
/_____/\__,_/\__, /\___/
            /____/
    "#
    );
}
