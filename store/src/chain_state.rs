//! The accepted chain, persisted over a `Database`.
//!
//! `ChainState` is the only source of truth for chain data across restarts.
//! Its key space is partitioned by a one-byte prefix:
//!
//! | Key | Value |
//! |---|---|
//! | `0x00 ‖ block id` | encoded block bytes |
//! | `0x01` | id of the last accepted block |
//! | `0x02` | initialized marker |
//!
//! Every mutation is staged in a [`WriteBuffer`] and reaches the backend only
//! on [`commit`](ChainState::commit), as one atomic batch. Only accepted blocks
//! are ever written, so any block read back is tagged `Accepted`.

use tracing::debug;
use tsvm_primitives::{Block, BlockId};

use crate::database::Database;
use crate::error::{StoreError, StoreResult};
use crate::write_buffer::WriteBuffer;

const BLOCK_PREFIX: u8 = 0x00;
const LAST_ACCEPTED_KEY: &[u8] = &[0x01];
const INITIALIZED_KEY: &[u8] = &[0x02];
const INITIALIZED_VALUE: &[u8] = &[0x01];

fn block_key(id: &BlockId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 32);
    key.push(BLOCK_PREFIX);
    key.extend_from_slice(id);
    key
}

/// Durable chain state: blocks, the last-accepted pointer, and the
/// initialized marker.
pub struct ChainState<D: Database> {
    db: D,
    pending: WriteBuffer,
    closed: bool,
}

impl<D: Database> ChainState<D> {
    /// Wrap a backend. Nothing is read until the first call.
    pub fn new(db: D) -> Self {
        Self {
            db,
            pending: WriteBuffer::new(),
            closed: false,
        }
    }

    /// Reports whether genesis has already been committed.
    pub fn is_initialized(&self) -> StoreResult<bool> {
        Ok(self.read(INITIALIZED_KEY)?.is_some())
    }

    /// Stage the initialized marker.
    pub fn set_initialized(&mut self) -> StoreResult<()> {
        self.stage(INITIALIZED_KEY.to_vec(), INITIALIZED_VALUE.to_vec())
    }

    /// Stage a block under its id.
    ///
    /// Re-writing identical bytes is a no-op. Different bytes under an
    /// existing id is an `Integrity` fault.
    pub fn put_block(&mut self, block: &Block) -> StoreResult<()> {
        let key = block_key(&block.id());
        if let Some(existing) = self.read(&key)? {
            if existing.as_slice() == block.bytes() {
                return Ok(());
            }
            return Err(StoreError::Integrity(block.id()));
        }
        self.stage(key, block.bytes().to_vec())
    }

    /// Load a stored block. The result is always `Accepted`.
    pub fn get_block(&self, id: &BlockId) -> StoreResult<Block> {
        let bytes = self
            .read(&block_key(id))?
            .ok_or(StoreError::NotFound(*id))?;
        let block = Block::parse(&bytes).map_err(StoreError::Corrupt)?;
        if block.id() != *id {
            return Err(StoreError::Integrity(*id));
        }
        Ok(block.into_accepted())
    }

    /// Reports whether a block is stored (i.e. accepted) under `id`.
    pub fn has_block(&self, id: &BlockId) -> StoreResult<bool> {
        Ok(self.read(&block_key(id))?.is_some())
    }

    /// Id of the most recently accepted block.
    pub fn get_last_accepted(&self) -> StoreResult<BlockId> {
        let bytes = self
            .read(LAST_ACCEPTED_KEY)?
            .ok_or(StoreError::NotInitialized)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Io(format!("last accepted pointer has {} bytes", bytes.len())))
    }

    /// Stage a new last-accepted pointer.
    pub fn set_last_accepted(&mut self, id: &BlockId) -> StoreResult<()> {
        self.stage(LAST_ACCEPTED_KEY.to_vec(), id.to_vec())
    }

    /// Flush every staged write to the backend as one atomic batch.
    ///
    /// Committing with nothing staged is a no-op. On failure the staged
    /// writes are dropped; the backend holds whatever the last successful
    /// commit left.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_open()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = self.pending.drain();
        let writes = batch.len();
        self.db.write_batch(batch)?;
        debug!(writes, "committed chain state");
        Ok(())
    }

    /// Discard every staged write.
    pub fn abort(&mut self) {
        if !self.pending.is_empty() {
            debug!(writes = self.pending.len(), "discarding staged chain writes");
        }
        self.pending.clear();
    }

    /// Number of staged, uncommitted writes.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Release the backend. Safe to call more than once.
    ///
    /// Fails with `UncommittedWrites` if writes are still staged.
    pub fn close(&mut self) -> StoreResult<()> {
        if self.closed {
            return Ok(());
        }
        if !self.pending.is_empty() {
            return Err(StoreError::UncommittedWrites(self.pending.len()));
        }
        self.db.close()?;
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Give back the backend.
    pub fn into_inner(self) -> D {
        self.db
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    /// Staged writes shadow committed data.
    fn read(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        if let Some(value) = self.pending.get(key) {
            return Ok(Some(value.to_vec()));
        }
        self.db.get(key)
    }

    fn stage(&mut self, key: Vec<u8>, value: Vec<u8>) -> StoreResult<()> {
        self.ensure_open()?;
        self.pending.set(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_db::MemDb;
    use tsvm_primitives::{Status, ChainError};

    fn genesis() -> Block {
        Block::genesis(&[1, 2, 3]).unwrap()
    }

    fn child(parent: &Block, data: &[u8]) -> Block {
        Block::with_data(parent.id(), parent.height() + 1, data, 10).unwrap()
    }

    #[test]
    fn test_fresh_state_is_uninitialized() {
        let state = ChainState::new(MemDb::new());
        assert!(!state.is_initialized().unwrap());
        assert_eq!(state.get_last_accepted().unwrap_err(), StoreError::NotInitialized);
    }

    #[test]
    fn test_put_get_block_tags_accepted() {
        let mut state = ChainState::new(MemDb::new());
        let block = genesis();
        state.put_block(&block).unwrap();
        state.commit().unwrap();

        let loaded = state.get_block(&block.id()).unwrap();
        assert_eq!(loaded.id(), block.id());
        assert_eq!(loaded.payload(), block.payload());
        assert_eq!(loaded.status(), Status::Accepted);
        assert!(state.has_block(&block.id()).unwrap());
    }

    #[test]
    fn test_get_missing_block() {
        let state = ChainState::new(MemDb::new());
        let err = state.get_block(&[9; 32]).unwrap_err();
        assert_eq!(err, StoreError::NotFound([9; 32]));
        assert!(!state.has_block(&[9; 32]).unwrap());
    }

    #[test]
    fn test_staged_writes_invisible_to_backend_until_commit() {
        let db = MemDb::new();
        let mut state = ChainState::new(db.clone());
        let block = genesis();

        state.put_block(&block).unwrap();
        state.set_last_accepted(&block.id()).unwrap();
        state.set_initialized().unwrap();

        // Visible through the state, not yet on the backend.
        assert!(state.is_initialized().unwrap());
        assert_eq!(state.get_last_accepted().unwrap(), block.id());
        assert!(db.is_empty().unwrap());
        assert_eq!(state.pending_writes(), 3);

        state.commit().unwrap();
        assert_eq!(db.len().unwrap(), 3);
        assert_eq!(state.pending_writes(), 0);
    }

    #[test]
    fn test_abort_discards_staged_writes() {
        let db = MemDb::new();
        let mut state = ChainState::new(db.clone());
        state.put_block(&genesis()).unwrap();
        state.set_initialized().unwrap();
        state.abort();

        assert!(!state.is_initialized().unwrap());
        state.commit().unwrap();
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn test_put_identical_block_is_idempotent() {
        let db = MemDb::new();
        let mut state = ChainState::new(db.clone());
        let block = genesis();
        state.put_block(&block).unwrap();
        state.commit().unwrap();
        let before = db.snapshot().unwrap();

        state.put_block(&block).unwrap();
        assert_eq!(state.pending_writes(), 0);
        state.commit().unwrap();
        assert_eq!(db.snapshot().unwrap(), before);
    }

    #[test]
    fn test_conflicting_bytes_under_same_id_is_integrity_fault() {
        let db = MemDb::new();
        let block = genesis();
        let other = child(&block, b"other");
        db.insert(block_key(&block.id()), other.bytes().to_vec()).unwrap();

        let mut state = ChainState::new(db);
        let err = state.put_block(&block).unwrap_err();
        assert_eq!(err, StoreError::Integrity(block.id()));
        // Reading it back also detects the mismatch.
        assert_eq!(
            state.get_block(&block.id()).unwrap_err(),
            StoreError::Integrity(block.id())
        );
    }

    #[test]
    fn test_corrupt_record() {
        let db = MemDb::new();
        db.insert(block_key(&[7; 32]), vec![0xff, 0xff, 0x00]).unwrap();
        let state = ChainState::new(db);
        let err = state.get_block(&[7; 32]).unwrap_err();
        assert_eq!(err, StoreError::Corrupt(ChainError::UnsupportedCodecVersion(0xffff)));
    }

    #[test]
    fn test_last_accepted_advances() {
        let mut state = ChainState::new(MemDb::new());
        let g = genesis();
        let c = child(&g, b"c");
        state.set_last_accepted(&g.id()).unwrap();
        state.commit().unwrap();
        state.set_last_accepted(&c.id()).unwrap();
        state.commit().unwrap();
        assert_eq!(state.get_last_accepted().unwrap(), c.id());
    }

    #[test]
    fn test_set_initialized_twice_is_harmless() {
        let db = MemDb::new();
        let mut state = ChainState::new(db.clone());
        state.set_initialized().unwrap();
        state.commit().unwrap();
        state.set_initialized().unwrap();
        state.commit().unwrap();
        assert!(state.is_initialized().unwrap());
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_access() {
        let mut state = ChainState::new(MemDb::new());
        state.close().unwrap();
        state.close().unwrap();
        assert!(state.is_closed());
        assert_eq!(state.is_initialized().unwrap_err(), StoreError::Closed);
        assert_eq!(state.commit().unwrap_err(), StoreError::Closed);
    }

    #[test]
    fn test_close_refuses_uncommitted_writes() {
        let mut state = ChainState::new(MemDb::new());
        state.set_initialized().unwrap();
        assert_eq!(state.close().unwrap_err(), StoreError::UncommittedWrites(1));
        assert!(!state.is_closed());
        state.commit().unwrap();
        state.close().unwrap();
    }
}
