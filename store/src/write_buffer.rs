//! Uncommitted write buffer layered over a `Database`.
//!
//! Writes are staged here and become visible to reads through
//! [`ChainState`](crate::ChainState) immediately, but reach the backend only
//! when the buffer is drained into a single atomic batch on commit. Dropping
//! the buffer (abort, crash) leaves the backend untouched.

use std::collections::BTreeMap;

use crate::database::BatchEntry;

/// Staged key-value writes.
///
/// Uses `BTreeMap` so batches are emitted in deterministic key order.
#[derive(Debug, Clone, Default)]
pub struct WriteBuffer {
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl WriteBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write, replacing any earlier staged value for the key.
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, value);
    }

    /// Look up a staged value.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.writes.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Total staged bytes (keys + values).
    pub fn total_bytes(&self) -> usize {
        self.writes.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Take every staged write as a batch, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<BatchEntry> {
        std::mem::take(&mut self.writes).into_iter().collect()
    }

    /// Discard every staged write.
    pub fn clear(&mut self) {
        self.writes.clear();
    }
}
