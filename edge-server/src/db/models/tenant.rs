//! Tenant and Site models.
//!
//! A tenant is an independent restaurant organization; every other table in
//! the system carries `tenant` as its first indexed column. A site is a
//! physical location owned by exactly one tenant.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantStatus {
    Active,
    Suspended,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Option<RecordId>,
    pub name: String,
    pub plan: String,
    pub status: TenantStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub plan: String,
}

/// A physical location belonging to a tenant. `timezone` drives day-closing
/// boundaries — an IANA name such as `"Europe/Lisbon"`, parsed into a
/// `chrono_tz::Tz` at the call sites that need local-day arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteCreate {
    pub name: String,
    pub timezone: String,
}
