//! # In-Memory Store
//!
//! A [`DocumentStore`] held in process memory. Used by tests and by
//! `stockbook --memory` for throwaway sessions.
//!
//! Records keep insertion order per table so scans are deterministic.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use stockbook_core::Document;

use crate::error::StoreResult;
use crate::store::{apply_patch, DocumentStore, Key, Table};

#[derive(Debug, Default)]
struct TableData {
    /// Encoded key → position in `rows`.
    index: HashMap<String, usize>,
    rows: Vec<Document>,
}

impl TableData {
    fn get(&self, key: &Key) -> Option<&Document> {
        self.index.get(&key.encode()).map(|&i| &self.rows[i])
    }

    fn upsert(&mut self, key: &Key, doc: Document) {
        match self.index.get(&key.encode()) {
            Some(&i) => self.rows[i] = doc,
            None => {
                self.rows.push(doc);
                self.index.insert(key.encode(), self.rows.len() - 1);
            }
        }
    }

    fn remove(&mut self, key: &Key) {
        if let Some(i) = self.index.remove(&key.encode()) {
            self.rows.remove(i);
            for pos in self.index.values_mut() {
                if *pos > i {
                    *pos -= 1;
                }
            }
        }
    }
}

/// Document store backed by a map per table.
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Table, TableData>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `table`.
    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map_or(0, |t| t.rows.len())
    }
}

impl DocumentStore for MemoryStore {
    async fn scan(&self, table: Table) -> StoreResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let rows = tables.get(&table).map(|t| t.rows.clone()).unwrap_or_default();
        debug!(table = %table, count = rows.len(), "Scanned memory table");
        Ok(rows)
    }

    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Document>> {
        table.check_key(key)?;
        let tables = self.tables.read().await;
        Ok(tables.get(&table).and_then(|t| t.get(key)).cloned())
    }

    async fn put(&self, table: Table, doc: Document) -> StoreResult<()> {
        let key = table.key_of(&doc)?;
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().upsert(&key, doc);
        Ok(())
    }

    async fn update(&self, table: Table, key: &Key, attributes: Document) -> StoreResult<Document> {
        table.check_key(key)?;
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();
        let patched = apply_patch(table, key, data.get(key).cloned(), attributes);
        data.upsert(key, patched.clone());
        Ok(patched)
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        table.check_key(key)?;
        let mut tables = self.tables.write().await;
        if let Some(data) = tables.get_mut(&table) {
            data.remove(key);
        }
        Ok(())
    }
}
