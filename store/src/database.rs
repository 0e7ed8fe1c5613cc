//! Backend key-value storage abstraction.
//!
//! `Database` is the raw medium underneath [`ChainState`](crate::ChainState).
//! Reads see only committed data; writes arrive as whole batches that must
//! be applied atomically (all or nothing) so a crash never exposes half a
//! logical operation.
//!
//! Implementations:
//! - `MemDb` (this crate): in-memory BTreeMap for testing
//! - `FjallDb` (this crate): on-disk LSM tree

use crate::error::StoreResult;

/// One key-value write in a batch.
pub type BatchEntry = (Vec<u8>, Vec<u8>);

/// Abstraction over committed key-value storage.
pub trait Database: Send {
    /// Get the committed value for a key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may optimize this.
    fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Apply every entry of `batch` atomically.
    fn write_batch(&mut self, batch: Vec<BatchEntry>) -> StoreResult<()>;

    /// Release backend resources. Must be safe to call more than once.
    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }
}
