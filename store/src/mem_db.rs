//! In-memory database for testing.
//!
//! `MemDb` implements `Database` using a `BTreeMap` for deterministic
//! key ordering. Clones share the same map, so a test can keep a handle,
//! drop the VM that owned the other one, and "restart" over the same data.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::database::{BatchEntry, Database};
use crate::error::{StoreError, StoreResult};

/// In-memory database backed by a shared `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemDb {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemDb {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed entries.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if nothing has been committed.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Overwrite a single committed entry, bypassing batches.
    ///
    /// Used by tests to plant corrupt records.
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()> {
        self.write()?.insert(key, value);
        Ok(())
    }

    /// Copy of every committed entry.
    pub fn snapshot(&self) -> StoreResult<BTreeMap<Vec<u8>, Vec<u8>>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>>> {
        self.data
            .read()
            .map_err(|_| StoreError::Io("mem db lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<Vec<u8>, Vec<u8>>>> {
        self.data
            .write()
            .map_err(|_| StoreError::Io("mem db lock poisoned".into()))
    }
}

impl Database for MemDb {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn write_batch(&mut self, batch: Vec<BatchEntry>) -> StoreResult<()> {
        let mut data = self.write()?;
        for (key, value) in batch {
            data.insert(key, value);
        }
        Ok(())
    }
}
