//! Customer model — phone lookup for delivery orders.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub name: String,
    /// Sanitized (whitespace-trimmed, wildcard metacharacters stripped)
    /// before storage; never empty.
    pub phone: String,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub phone: String,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}
