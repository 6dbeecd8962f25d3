use anyhow::{bail, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{DataStore, RowId, Table};
use crate::logger::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    DeleteAll,
    Insert,
    Count,
}

/// One request as the store received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DeleteAll(Table),
    Insert(Table, usize),
    Count(Table),
}

#[derive(Default)]
struct State {
    rows: HashMap<Table, Vec<(RowId, Value)>>,
    next_id: HashMap<Table, u64>,
    calls: Vec<Call>,
}

/// In-process stand-in for the backend, used by `--dry-run`.
///
/// Identifiers are `<table>-<n>`, numbered per table from 1 for the
/// lifetime of the store.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<State>,
    failures: HashSet<(Op, Table)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `op` against `table` fail.
    #[cfg(test)]
    pub fn failing(mut self, op: Op, table: Table) -> Self {
        self.failures.insert((op, table));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    #[cfg(test)]
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state
            .borrow()
            .rows
            .get(&table)
            .map(|rows| rows.iter().map(|(_, v)| v.clone()).collect())
            .unwrap_or_default()
    }

    fn check(&self, op: Op, table: Table) -> Result<()> {
        if self.failures.contains(&(op, table)) {
            bail!("simulated {:?} failure on {}", op, table);
        }
        Ok(())
    }
}

impl DataStore for MemoryStore {
    fn delete_all(&self, table: Table) -> Result<()> {
        self.state.borrow_mut().calls.push(Call::DeleteAll(table));
        self.check(Op::DeleteAll, table)?;
        let removed = self
            .state
            .borrow_mut()
            .rows
            .remove(&table)
            .map_or(0, |rows| rows.len());
        debug(&format!("memory: cleared {} rows from {}", removed, table));
        Ok(())
    }

    fn insert(&self, table: Table, rows: &[Value]) -> Result<Vec<RowId>> {
        self.state
            .borrow_mut()
            .calls
            .push(Call::Insert(table, rows.len()));
        self.check(Op::Insert, table)?;

        let mut state = self.state.borrow_mut();
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let n = state.next_id.entry(table).or_insert(0);
            *n += 1;
            let id = RowId(format!("{}-{}", table, n));
            state
                .rows
                .entry(table)
                .or_default()
                .push((id.clone(), row.clone()));
            ids.push(id);
        }
        debug(&format!("memory: inserted {} rows into {}", ids.len(), table));
        Ok(ids)
    }

    fn count(&self, table: Table) -> Result<u64> {
        self.state.borrow_mut().calls.push(Call::Count(table));
        self.check(Op::Count, table)?;
        Ok(self
            .state
            .borrow()
            .rows
            .get(&table)
            .map_or(0, |rows| rows.len() as u64))
    }
}
