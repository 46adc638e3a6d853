//! redb-based storage layer for materials orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `session_id` | `MaterialsOrder` (JSON) | One header row per session |
//! | `line_items` | `(session_id, item_id)` | `LineItem` (JSON) | Order line items |
//! | `counters` | name | `u64` | Item ID allocator |
//!
//! Every save operation runs inside a single write transaction; dropping the
//! transaction without committing aborts all of its writes. redb commits are
//! durable as soon as `commit()` returns.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::order::{LineItem, MaterialsOrder};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for order headers: key = session_id, value = JSON-serialized MaterialsOrder
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for line items: key = (session_id, item_id), value = JSON-serialized LineItem
const ITEMS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("line_items");

/// Table for counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ITEM_ID_KEY: &str = "item_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found for session: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ITEM_ID_KEY)?.is_none() {
                counters.insert(ITEM_ID_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ITEMS_TABLE)?;
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            counters.insert(ITEM_ID_KEY, 0u64)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Header Operations ==========

    /// Get an order header by session ID
    pub fn get_order(&self, session_id: &str) -> StorageResult<Option<MaterialsOrder>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order header within a write transaction
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<Option<MaterialsOrder>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Store an order header
    pub fn store_order(&self, txn: &WriteTransaction, order: &MaterialsOrder) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.session_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Delete an order header and all of its line items
    pub fn delete_order(&self, txn: &WriteTransaction, session_id: &str) -> StorageResult<()> {
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            table.remove(session_id)?;
        }
        let item_ids: Vec<u64> = self
            .get_items_txn(txn, session_id)?
            .iter()
            .map(|i| i.id)
            .collect();
        let mut items = txn.open_table(ITEMS_TABLE)?;
        for id in item_ids {
            items.remove((session_id, id))?;
        }
        Ok(())
    }

    // ========== Line Item Operations ==========

    /// Get all line items for a session
    pub fn get_items(&self, session_id: &str) -> StorageResult<Vec<LineItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ITEMS_TABLE)?;

        let mut items = Vec::new();
        let range_start = (session_id, 0u64);
        let range_end = (session_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let item: LineItem = serde_json::from_slice(value.value())?;
            items.push(item);
        }
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// Get all line items for a session within a write transaction
    pub fn get_items_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<Vec<LineItem>> {
        let table = txn.open_table(ITEMS_TABLE)?;

        let mut items = Vec::new();
        let range_start = (session_id, 0u64);
        let range_end = (session_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let item: LineItem = serde_json::from_slice(value.value())?;
            items.push(item);
        }
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// Store a line item
    pub fn store_item(&self, txn: &WriteTransaction, item: &LineItem) -> StorageResult<()> {
        let mut table = txn.open_table(ITEMS_TABLE)?;
        let key = (item.session_id.as_str(), item.id);
        let value = serde_json::to_vec(item)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Delete a line item
    pub fn delete_item(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        item_id: u64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ITEMS_TABLE)?;
        table.remove((session_id, item_id))?;
        Ok(())
    }

    /// Allocate the next line item ID (within the caller's transaction)
    pub fn next_item_id(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut counters = txn.open_table(COUNTERS_TABLE)?;
        let current = counters.get(ITEM_ID_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        counters.insert(ITEM_ID_KEY, next)?;
        Ok(next)
    }
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish()
    }
}
