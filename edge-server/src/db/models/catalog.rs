//! Catalog — the menu-catalog CRUD is an external collaborator; the
//! order core only reads an immutable item snapshot (id, name, price,
//! availability). This module models exactly that read surface plus the
//! minimal Family → Subfamily → Item hierarchy the snapshot is drawn from,
//! with no pricing-rule engine, no categories CRUD, and no image/label
//! concerns — those live outside this core entirely.

use serde::{Deserialize, Serialize};
use shared::Money;
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subfamily {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub family: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<RecordId>,
    pub tenant: String,
    pub subfamily: String,
    pub name: String,
    pub base_price: Money,
    pub available: bool,
    /// Kitchen routing zone/category this item prints to.
    pub print_zone: String,
}

/// The immutable snapshot an `OrderLine` captures at `add_line` time.
/// "Catalog change isolation": future price/availability changes on the
/// live `Item` row never retroactively touch lines already captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub print_zone: String,
}

impl From<Item> for ItemSnapshot {
    fn from(item: Item) -> Self {
        Self {
            item_id: item.id.map(|t| t.to_string()).unwrap_or_default(),
            name: item.name,
            unit_price: item.base_price,
            print_zone: item.print_zone,
        }
    }
}
