use std::io::{self, Write};

use crate::logger::{error, info};
use crate::store::{DataStore, Table};

/// Delete every row of every table in [`Table::CLEAR_ORDER`].
///
/// Best effort: a failing table is reported and the rest are still
/// cleared. Returns the tables that could not be cleared.
pub fn clear_all<S, W>(store: &S, out: &mut W) -> io::Result<Vec<Table>>
where
    S: DataStore + ?Sized,
    W: Write,
{
    writeln!(out, "\n🗑️  Clearing existing data...")?;
    let mut failed = Vec::new();
    for table in Table::CLEAR_ORDER {
        match store.delete_all(table) {
            Ok(()) => {
                info(&format!("cleared {}", table));
                writeln!(out, "  ✅ Cleared {}", table)?;
            }
            Err(e) => {
                error(&format!("clear {} failed: {:#}", table, e));
                writeln!(out, "  ⚠️  {}: {:#}", table, e)?;
                failed.push(table);
            }
        }
    }
    Ok(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Call, Op};
    use crate::store::MemoryStore;

    #[test]
    fn deletes_each_table_once_in_order() {
        let store = MemoryStore::new();
        let mut out = Vec::new();
        let failed = clear_all(&store, &mut out).unwrap();
        assert!(failed.is_empty());

        let expected: Vec<Call> = Table::CLEAR_ORDER.iter().map(|t| Call::DeleteAll(*t)).collect();
        assert_eq!(store.calls(), expected);
    }

    #[test]
    fn keeps_going_after_a_failure() {
        let store = MemoryStore::new()
            .failing(Op::DeleteAll, Table::Refunds)
            .failing(Op::DeleteAll, Table::Shifts);
        let mut out = Vec::new();
        let failed = clear_all(&store, &mut out).unwrap();

        assert_eq!(failed, vec![Table::Refunds, Table::Shifts]);
        assert_eq!(store.calls().len(), Table::CLEAR_ORDER.len());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("⚠️  refunds: simulated DeleteAll failure on refunds"));
        assert!(text.contains("✅ Cleared settings"));
    }
}
