mod memory;
mod rest;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use memory::{Call, MemoryStore, Op};
pub use rest::RestStore;

/// The backend tables this tool touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    InventoryAdjustments,
    Refunds,
    Transactions,
    OrderItems,
    Orders,
    Shifts,
    Customers,
    Products,
    Settings,
}

impl Table {
    /// Delete order for a full reset. Every table appears before each
    /// table it references.
    pub const CLEAR_ORDER: [Table; 9] = [
        Table::InventoryAdjustments,
        Table::Refunds,
        Table::Transactions,
        Table::OrderItems,
        Table::Orders,
        Table::Shifts,
        Table::Customers,
        Table::Products,
        Table::Settings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::InventoryAdjustments => "inventory_adjustments",
            Table::Refunds => "refunds",
            Table::Transactions => "transactions",
            Table::OrderItems => "order_items",
            Table::Orders => "orders",
            Table::Shifts => "shifts",
            Table::Customers => "customers",
            Table::Products => "products",
            Table::Settings => "settings",
        }
    }

    /// Tables this one holds foreign keys to, within the set above.
    #[cfg(test)]
    pub fn references(self) -> &'static [Table] {
        match self {
            Table::InventoryAdjustments => &[Table::Products, Table::Shifts],
            Table::Refunds => &[Table::Orders, Table::Transactions],
            Table::Transactions => &[Table::Orders, Table::Shifts],
            Table::OrderItems => &[Table::Orders, Table::Products],
            Table::Orders => &[Table::Customers, Table::Shifts],
            Table::Shifts => &[],
            Table::Customers => &[],
            Table::Products => &[],
            Table::Settings => &[],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier the backend generated for an inserted row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

/// Table-level operations needed to reset and seed the backend.
pub trait DataStore {
    /// Remove every row of `table`.
    fn delete_all(&self, table: Table) -> Result<()>;

    /// Insert all `rows` in one request. Identifiers come back in input
    /// order.
    fn insert(&self, table: Table, rows: &[Value]) -> Result<Vec<RowId>>;

    fn count(&self, table: Table) -> Result<u64>;
}

/// Serialize typed records into the JSON rows [`DataStore::insert`] takes.
pub fn to_rows<T: Serialize>(records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(anyhow::Error::from))
        .collect()
}
