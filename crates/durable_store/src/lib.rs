//! # Durable Store
//!
//! Bucketed key-value records on an embedded redb file.
//!
//! Buckets map to redb tables (`&str -> &str`). Opening a store creates the
//! `Config`, `Sensors` and `Grids` buckets; a bucket that was never created
//! reads as empty.

use std::path::Path;

use contracts::{ContractError, DurableStore, EntryVisitor, DEFAULT_BUCKETS};
use redb::{Database, ReadableTable, TableDefinition, TableError};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// redb failures, flattened into [`ContractError::Store`] at the trait boundary
#[derive(Error, Debug)]
pub enum RedbStoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
}

fn bucket(name: &str) -> TableDefinition<'_, &'static str, &'static str> {
    TableDefinition::new(name)
}

/// Durable store on a redb database file
pub struct RedbStore {
    name: String,
    db: Database,
}

impl RedbStore {
    /// Open or create the database at `path`
    #[instrument(name = "redb_store_open", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let name = "redb".to_string();
        let db = Self::create(path.as_ref()).map_err(|e| ContractError::store(&name, e.to_string()))?;
        info!(store = %name, "RedbStore opened");
        Ok(Self { name, db })
    }

    fn create(path: &Path) -> Result<Database, RedbStoreError> {
        let db = Database::create(path)?;

        // Ensure buckets exist
        let write_txn = db.begin_write()?;
        {
            for name in DEFAULT_BUCKETS {
                let _ = write_txn.open_table(bucket(name))?;
            }
        }
        write_txn.commit()?;

        Ok(db)
    }

    /// Close the database file
    pub fn close(self) {
        debug!(store = %self.name, "RedbStore closed");
        drop(self.db);
    }

    fn put_inner(&self, bucket_name: &str, key: &str, value: &str) -> Result<(), RedbStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(bucket(bucket_name))?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_inner(&self, bucket_name: &str, key: &str) -> Result<Option<String>, RedbStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(bucket(bucket_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = table.get(key)?.map(|value| value.value().to_string());
        Ok(value)
    }

    fn delete_inner(&self, bucket_name: &str, key: &str) -> Result<(), RedbStoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(bucket(bucket_name))?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn snapshot(&self, bucket_name: &str) -> Result<Vec<(String, String)>, RedbStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(bucket(bucket_name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }

    fn store_error(&self, err: RedbStoreError) -> ContractError {
        ContractError::store(&self.name, err.to_string())
    }
}

impl DurableStore for RedbStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, bucket: &str, key: &str, value: &str) -> Result<(), ContractError> {
        self.put_inner(bucket, key, value)
            .map_err(|e| self.store_error(e))
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Option<String>, ContractError> {
        self.get_inner(bucket, key).map_err(|e| self.store_error(e))
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), ContractError> {
        self.delete_inner(bucket, key)
            .map_err(|e| self.store_error(e))
    }

    fn iterate(&self, bucket: &str, visitor: &mut EntryVisitor<'_>) -> Result<(), ContractError> {
        let entries = self.snapshot(bucket).map_err(|e| self.store_error(e))?;
        for (key, value) in &entries {
            visitor(key, value)?;
        }
        Ok(())
    }
}
