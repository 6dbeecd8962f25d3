use std::io::{self, Write};

use crate::logger::error;
use crate::store::{DataStore, Table};

pub const RULE_WIDTH: usize = 60;

/// Tables reported after seeding, with their display labels.
const REPORTED: [(Table, &str); 4] = [
    (Table::Products, "Products"),
    (Table::Customers, "Customers"),
    (Table::Orders, "Orders"),
    (Table::OrderItems, "Order Items"),
];

#[derive(Debug)]
pub struct SummaryRow {
    pub table: Table,
    pub label: &'static str,
    pub count: Result<u64, String>,
}

/// Row counts read back from the backend after seeding.
#[derive(Debug)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Count each reported table; a failing count is kept as its message.
    pub fn collect<S: DataStore + ?Sized>(store: &S) -> Self {
        let rows = REPORTED
            .iter()
            .map(|&(table, label)| {
                let count = store.count(table).map_err(|e| {
                    error(&format!("count {} failed: {:#}", table, e));
                    format!("{:#}", e)
                });
                SummaryRow { table, label, count }
            })
            .collect();
        Summary { rows }
    }

    #[cfg(test)]
    pub fn count(&self, table: Table) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| r.table == table)
            .and_then(|r| r.count.as_ref().ok().copied())
    }

    /// `products=55 customers=5 ...` for the log file.
    pub fn brief(&self) -> String {
        self.rows
            .iter()
            .map(|r| match &r.count {
                Ok(n) => format!("{}={}", r.table, n),
                Err(_) => format!("{}=?", r.table),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out, "\n{}", rule)?;
        writeln!(out, "📊 Database Seeding Summary")?;
        writeln!(out, "{}", rule)?;
        for row in &self.rows {
            match &row.count {
                Ok(n) => writeln!(out, "  ✅ {}: {}", row.label, n)?,
                Err(e) => writeln!(out, "  ❌ {}: Error - {}", row.label, e)?,
            }
        }
        writeln!(out, "{}", rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Call, MemoryStore, Op};
    use serde_json::json;

    #[test]
    fn counts_each_reported_table() {
        let store = MemoryStore::new();
        store.insert(Table::Products, &[json!({}), json!({})]).unwrap();
        let summary = Summary::collect(&store);

        assert_eq!(
            store.calls()[1..],
            [
                Call::Count(Table::Products),
                Call::Count(Table::Customers),
                Call::Count(Table::Orders),
                Call::Count(Table::OrderItems),
            ]
        );
        assert_eq!(summary.count(Table::Products), Some(2));
        assert_eq!(summary.count(Table::Orders), Some(0));
        assert_eq!(summary.brief(), "products=2 customers=0 orders=0 order_items=0");
    }

    #[test]
    fn failed_count_does_not_stop_the_report() {
        let store = MemoryStore::new().failing(Op::Count, Table::Customers);
        let summary = Summary::collect(&store);
        assert_eq!(store.calls().len(), 4);
        assert_eq!(summary.count(Table::Customers), None);
        assert_eq!(summary.count(Table::OrderItems), Some(0));

        let mut out = Vec::new();
        summary.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("❌ Customers: Error - simulated Count failure on customers"));
        assert!(text.contains("✅ Order Items: 0"));
        assert!(text.contains(&"=".repeat(RULE_WIDTH)));
    }
}
