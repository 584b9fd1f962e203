//! Dining table model and the cross-cutting blacklist.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub site: String,
    pub table_number: String,
    pub status: TableStatus,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub site: String,
    pub table_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlacklistEntityType {
    Table,
    Card,
}

/// `(tenant, entity_type, entity_value)` unique — used to reject operations
/// up front (blacklisted table, blacklisted card last-four).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub entity_type: BlacklistEntityType,
    pub entity_value: String,
    pub reason: Option<String>,
}
