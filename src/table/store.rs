use crate::table::Table;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Process-wide holder of the most recently loaded tables, keyed by sheet name.
///
/// Tables are published as `Arc<Table>`: a publish swaps the pointer under a short
/// write lock, and a reader keeps whatever `Arc` it got from [`TableStore::get`] for
/// the rest of its operation. A reader therefore sees either the old or the new
/// table in full, never rows from both.
#[derive(Debug, Default)]
pub struct TableStore {
    tables: RwLock<HashMap<String, Arc<Table>>>,
    empty: Arc<Table>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest published table for `name`, or an empty table if none was published.
    pub fn get(&self, name: &str) -> Arc<Table> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }

    /// Atomically replaces the table for `name`.
    pub fn publish(&self, name: &str, table: Table) {
        let table = Arc::new(table);
        self.tables.write().insert(name.to_owned(), table);
    }
}
