//! Audit log service
//!
//! `AuditService` is the front door to the audit trail:
//! - asynchronous writes via an mpsc channel (see [`super::worker::AuditWorker`])
//! - synchronous writes for startup/shutdown bookkeeping
//! - queries and chain verification, read straight from SurrealDB
//! - a LOCK file that detects abnormal shutdowns and long downtimes

use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageError};
use super::types::*;

const LOCK_FILE_NAME: &str = "audit.lock";

/// Beyond this gap since the last audit entry, treat the system as having
/// been down a long time rather than merely quiet.
const LONG_DOWNTIME_THRESHOLD_MS: i64 = 24 * 60 * 60 * 1000;

/// One request sent to [`AuditService::log`].
pub struct AuditLogRequest {
    pub tenant_id: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<String>,
    pub operator_name: Option<String>,
    pub details: serde_json::Value,
}

/// Audit log service.
///
/// Log requests arrive over an mpsc channel and are written by a background
/// [`super::worker::AuditWorker`]; queries read straight from `storage`.
///
/// ## LOCK file
///
/// On startup a `audit.lock` file is written with the current timestamp and
/// removed on a clean shutdown. The next startup checks:
/// - the LOCK file still exists → the previous run did not shut down cleanly
/// - the LOCK file is gone but the last audit entry is older than the long
///   downtime threshold → the system was simply off for a long stretch
///
/// Both conditions are recorded as ordinary audit entries — there is no
/// separate issue-tracking table; an operator reviewing the trail sees the
/// gap directly.
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
    lock_path: PathBuf,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService")
            .field("lock_path", &self.lock_path)
            .finish_non_exhaustive()
    }
}

impl AuditService {
    /// `data_dir` — directory the LOCK file lives in.
    pub fn new(
        db: Surreal<Db>,
        data_dir: &std::path::Path,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let lock_path = data_dir.join(LOCK_FILE_NAME);
        let storage = AuditStorage::new(db);
        let service = Arc::new(Self {
            storage,
            tx,
            lock_path,
        });
        (service, rx)
    }

    /// Called once at startup, per tenant, to detect and log abnormal
    /// shutdowns / long downtimes and to recreate the LOCK file.
    pub async fn on_startup(&self, tenant_id: &str) {
        let now = shared::util::now_millis();

        if self.lock_path.exists() {
            let lock_content = std::fs::read_to_string(&self.lock_path).unwrap_or_default();
            let last_start_ts: i64 = lock_content.trim().parse().unwrap_or(0);

            tracing::warn!(
                tenant_id,
                last_start_ts,
                "abnormal shutdown detected — LOCK file was still present"
            );

            let details = serde_json::json!({
                "last_start_timestamp": last_start_ts,
                "detected_at": now,
            });
            if let Err(e) = self
                .log_sync(
                    tenant_id,
                    AuditAction::SystemAbnormalShutdown,
                    "system",
                    "server:main",
                    details,
                )
                .await
            {
                tracing::error!(error = ?e, "failed to log abnormal shutdown");
            }
        }

        if let Ok((entries, _)) = self.storage.query_last(tenant_id, 1).await
            && let Some(last_entry) = entries.first()
        {
            let gap = now - last_entry.timestamp;
            if gap > LONG_DOWNTIME_THRESHOLD_MS {
                let hours = gap / (60 * 60 * 1000);
                tracing::warn!(tenant_id, hours, "long downtime detected");

                let details = serde_json::json!({
                    "last_activity_timestamp": last_entry.timestamp,
                    "downtime_ms": gap,
                    "downtime_hours": hours,
                });
                if let Err(e) = self
                    .log_sync(
                        tenant_id,
                        AuditAction::SystemLongDowntime,
                        "system",
                        "server:main",
                        details,
                    )
                    .await
                {
                    tracing::error!(error = ?e, "failed to log long downtime");
                }
            }
        }

        if let Err(e) = std::fs::write(&self.lock_path, now.to_string()) {
            tracing::error!(error = ?e, "failed to create audit LOCK file");
        }
    }

    /// Called on a clean shutdown — removes the LOCK file.
    pub fn on_shutdown(&self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::error!(error = ?e, "failed to remove audit LOCK file");
        }
    }

    /// Queue an entry for asynchronous write. Blocks if the channel is full
    /// — audit entries are never allowed to be dropped silently.
    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        tenant_id: impl Into<String>,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) {
        let req = AuditLogRequest {
            tenant_id: tenant_id.into(),
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            operator_id,
            operator_name,
            details,
        };

        if self.tx.send(req).await.is_err() {
            tracing::error!("audit log channel closed — audit entry lost");
        }
    }

    /// Write synchronously (startup/shutdown bookkeeping, where there is no
    /// worker loop running yet).
    pub async fn log_sync(
        &self,
        tenant_id: impl Into<String>,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        details: serde_json::Value,
    ) -> Result<AuditEntry, AuditStorageError> {
        self.storage
            .append(
                tenant_id.into(),
                action,
                resource_type.into(),
                resource_id.into(),
                None,
                None,
                details,
            )
            .await
    }

    pub async fn query(&self, q: &AuditQuery) -> Result<(Vec<AuditEntry>, u64), AuditStorageError> {
        self.storage.query(q).await
    }

    pub async fn verify_chain(
        &self,
        tenant_id: &str,
    ) -> Result<AuditChainVerification, AuditStorageError> {
        self.storage.verify_chain(tenant_id).await
    }

    pub fn storage(&self) -> &AuditStorage {
        &self.storage
    }
}
