//! Audit log storage (SurrealDB)
//!
//! Append-only: there is no delete/update entry point. SHA256 hash-chains
//! every record so tampering with any past entry breaks the chain.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use thiserror::Error;

use super::types::{AuditAction, AuditChainVerification, AuditEntry, AuditQuery};

#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for AuditStorageError {
    fn from(err: surrealdb::Error) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

impl From<AuditStorageError> for shared::error::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::error::AppError::internal(err.to_string())
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct AuditRow {
    sequence: u64,
    tenant_id: String,
    timestamp: i64,
    action: AuditAction,
    resource_type: String,
    resource_id: String,
    operator_id: Option<String>,
    operator_name: Option<String>,
    details: serde_json::Value,
    prev_hash: String,
    curr_hash: String,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        AuditEntry {
            id: row.sequence,
            tenant_id: row.tenant_id,
            timestamp: row.timestamp,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            operator_id: row.operator_id,
            operator_name: row.operator_name,
            details: row.details,
            prev_hash: row.prev_hash,
            curr_hash: row.curr_hash,
        }
    }
}

/// Append-only audit log storage.
///
/// Per-tenant hash chains: each tenant's `genesis` entry chains only to its
/// own prior entries, so one tenant's audit trail can be verified without
/// reading another tenant's rows.
#[derive(Clone)]
pub struct AuditStorage {
    db: Surreal<Db>,
    append_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AuditStorage {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            append_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Append one audit entry.
    ///
    /// 1. read this tenant's last sequence/hash
    /// 2. compute the new entry's hash
    /// 3. write it
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        &self,
        tenant_id: String,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) -> AuditStorageResult<AuditEntry> {
        let _guard = self.append_lock.lock().await;

        let mut last_resp = self
            .db
            .query(
                "SELECT sequence, curr_hash FROM audit_log \
                 WHERE tenant_id = $tenant_id ORDER BY sequence DESC LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.clone()))
            .await?;
        let last: Vec<serde_json::Value> = last_resp.take(0)?;
        let last: Option<(u64, String)> = last.into_iter().next().map(|v| {
            (
                v.get("sequence").and_then(|n| n.as_u64()).unwrap_or(0),
                v.get("curr_hash")
                    .and_then(|s| s.as_str())
                    .unwrap_or("genesis")
                    .to_string(),
            )
        });

        let (sequence, prev_hash) = match last {
            Some((seq, hash)) => (seq + 1, hash),
            None => (1, "genesis".to_string()),
        };

        let timestamp = shared::util::now_millis();
        let curr_hash = compute_audit_hash(
            &prev_hash,
            &tenant_id,
            sequence,
            timestamp,
            &action,
            &resource_type,
            &resource_id,
            operator_id.as_deref(),
            operator_name.as_deref(),
            &details,
        );

        let entry = AuditEntry {
            id: sequence,
            tenant_id,
            timestamp,
            action,
            resource_type,
            resource_id,
            operator_id,
            operator_name,
            details,
            prev_hash,
            curr_hash,
        };

        self.db
            .query(
                "CREATE audit_log CONTENT {
                    sequence: $sequence,
                    tenant_id: $tenant_id,
                    timestamp: $timestamp,
                    action: $action,
                    resource_type: $resource_type,
                    resource_id: $resource_id,
                    operator_id: $operator_id,
                    operator_name: $operator_name,
                    details: $details,
                    prev_hash: $prev_hash,
                    curr_hash: $curr_hash,
                }",
            )
            .bind(("sequence", entry.id))
            .bind(("tenant_id", entry.tenant_id.clone()))
            .bind(("timestamp", entry.timestamp))
            .bind(("action", entry.action))
            .bind(("resource_type", entry.resource_type.clone()))
            .bind(("resource_id", entry.resource_id.clone()))
            .bind(("operator_id", entry.operator_id.clone()))
            .bind(("operator_name", entry.operator_name.clone()))
            .bind(("details", entry.details.clone()))
            .bind(("prev_hash", entry.prev_hash.clone()))
            .bind(("curr_hash", entry.curr_hash.clone()))
            .await?;

        Ok(entry)
    }

    pub async fn query(&self, q: &AuditQuery) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let mut conditions = vec!["tenant_id = $tenant_id".to_string()];
        if q.from.is_some() {
            conditions.push("timestamp >= $from".to_string());
        }
        if q.to.is_some() {
            conditions.push("timestamp <= $to".to_string());
        }
        if q.action.is_some() {
            conditions.push("action = $action".to_string());
        }
        if q.operator_id.is_some() {
            conditions.push("operator_id = $operator_id".to_string());
        }
        if q.resource_type.is_some() {
            conditions.push("resource_type = $resource_type".to_string());
        }
        let where_clause = format!(" WHERE {}", conditions.join(" AND "));

        let sql = format!(
            "SELECT * FROM audit_log{where_clause} ORDER BY sequence DESC LIMIT $limit START $offset; \
             SELECT count() FROM audit_log{where_clause} GROUP ALL;"
        );

        let response = self
            .db
            .query(sql)
            .bind(("tenant_id", q.tenant_id.clone()))
            .bind(("from", q.from))
            .bind(("to", q.to))
            .bind(("action", q.action))
            .bind(("operator_id", q.operator_id.clone()))
            .bind(("resource_type", q.resource_type.clone()))
            .bind(("limit", q.limit as i64))
            .bind(("offset", q.offset as i64))
            .await?;

        self.rows_and_count(response).await
    }

    /// The last `count` entries for a tenant, newest first.
    pub async fn query_last(
        &self,
        tenant_id: &str,
        count: usize,
    ) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let response = self
            .db
            .query(
                "SELECT * FROM audit_log WHERE tenant_id = $tenant_id \
                 ORDER BY sequence DESC LIMIT $limit; \
                 SELECT count() FROM audit_log WHERE tenant_id = $tenant_id GROUP ALL;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", count as i64))
            .await?;
        self.rows_and_count(response).await
    }

    async fn rows_and_count(
        &self,
        mut response: surrealdb::Response,
    ) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let rows: Vec<AuditRow> = response.take(0)?;
        let total_rows: Vec<serde_json::Value> = response.take(1).unwrap_or_default();
        let total = total_rows
            .into_iter()
            .next()
            .and_then(|v| v.get("count").and_then(|c| c.as_u64()))
            .unwrap_or(rows.len() as u64);
        Ok((rows.into_iter().map(AuditEntry::from).collect(), total))
    }

    /// Walk a tenant's full chain and confirm every `curr_hash` recomputes.
    pub async fn verify_chain(&self, tenant_id: &str) -> AuditStorageResult<AuditChainVerification> {
        let mut response = self
            .db
            .query("SELECT * FROM audit_log WHERE tenant_id = $tenant_id ORDER BY sequence ASC")
            .bind(("tenant_id", tenant_id.to_string()))
            .await?;
        let rows: Vec<AuditRow> = response.take(0)?;

        let mut prev_hash = "genesis".to_string();
        let mut checked = 0u64;
        for row in &rows {
            let expected = compute_audit_hash(
                &prev_hash,
                &row.tenant_id,
                row.sequence,
                row.timestamp,
                &row.action,
                &row.resource_type,
                &row.resource_id,
                row.operator_id.as_deref(),
                row.operator_name.as_deref(),
                &row.details,
            );
            checked += 1;
            if expected != row.curr_hash {
                return Ok(AuditChainVerification {
                    entries_checked: checked,
                    intact: false,
                    broken_at: Some(row.sequence),
                });
            }
            prev_hash = row.curr_hash.clone();
        }

        Ok(AuditChainVerification {
            entries_checked: checked,
            intact: true,
            broken_at: None,
        })
    }
}

/// Compute the SHA256 hash of an audit entry.
///
/// All stored fields participate, so any later modification breaks the
/// chain. Variable-length fields are separated by `\x00` so e.g. `("ab",
/// "cd")` cannot collide with `("abc", "d")`.
#[allow(clippy::too_many_arguments)]
fn compute_audit_hash(
    prev_hash: &str,
    tenant_id: &str,
    id: u64,
    timestamp: i64,
    action: &AuditAction,
    resource_type: &str,
    resource_id: &str,
    operator_id: Option<&str>,
    operator_name: Option<&str>,
    details: &serde_json::Value,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(tenant_id.as_bytes());
    hasher.update(b"\x00");
    hasher.update(id.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());

    let action_str = serde_json::to_string(action).unwrap_or_default();
    hasher.update(action_str.as_bytes());
    hasher.update(b"\x00");

    hasher.update(resource_type.as_bytes());
    hasher.update(b"\x00");
    hasher.update(resource_id.as_bytes());
    hasher.update(b"\x00");

    hash_optional(&mut hasher, operator_id);
    hash_optional(&mut hasher, operator_name);

    let details_json = serde_json::to_string(details).unwrap_or_default();
    hasher.update(details_json.as_bytes());
    hasher.update(b"\x00");

    format!("{:x}", hasher.finalize())
}

/// `\x00` = None, `\x01` + bytes = Some
fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    hasher.update(b"\x00");
}
