//! Audit log background worker
//!
//! Consumes `AuditLogRequest`s from an mpsc channel and writes them through
//! `AuditStorage`. Retries up to 3 times with exponential backoff; exits
//! once the channel is closed.

use super::service::AuditLogRequest;
use super::storage::AuditStorage;

const MAX_RETRIES: u32 = 3;

/// Background audit log writer.
///
/// Consumes log requests from the mpsc channel and writes them through
/// `AuditStorage`, retrying up to 3 times with 100ms → 200ms → 400ms backoff.
pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(storage: AuditStorage) -> Self {
        Self { storage }
    }

    /// Run the worker (blocks until the channel closes).
    pub async fn run(self, mut rx: tokio::sync::mpsc::Receiver<AuditLogRequest>) {
        tracing::info!("audit log worker started");

        while let Some(req) = rx.recv().await {
            let mut last_err = None;

            for attempt in 0..=MAX_RETRIES {
                if attempt > 0 {
                    let backoff = std::time::Duration::from_millis(100 << (attempt - 1));
                    tracing::warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying audit entry write"
                    );
                    tokio::time::sleep(backoff).await;
                }

                match self
                    .storage
                    .append(
                        req.tenant_id.clone(),
                        req.action,
                        req.resource_type.clone(),
                        req.resource_id.clone(),
                        req.operator_id.clone(),
                        req.operator_name.clone(),
                        req.details.clone(),
                    )
                    .await
                {
                    Ok(entry) => {
                        if attempt > 0 {
                            tracing::info!(
                                audit_id = entry.id,
                                attempt,
                                "audit entry recorded after retry"
                            );
                        } else {
                            tracing::debug!(
                                audit_id = entry.id,
                                action = %entry.action,
                                resource = %entry.resource_type,
                                "audit entry recorded"
                            );
                        }
                        last_err = None;
                        break;
                    }
                    Err(e) => {
                        last_err = Some(e);
                    }
                }
            }

            if let Some(e) = last_err {
                tracing::error!("AUDIT ENTRY LOST after {} retries: {:?}", MAX_RETRIES, e);
            }
        }

        tracing::info!("audit log channel closed, worker stopping");
    }
}
