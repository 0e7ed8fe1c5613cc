//! Storage error types.

use tsvm_primitives::{id_to_hex, BlockId, ChainError};

/// Errors raised by the chain state and its backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No block is stored under this id.
    #[error("block {} not found", id_to_hex(.0))]
    NotFound(BlockId),

    /// The chain has never been initialized (no last-accepted pointer).
    #[error("chain state not initialized")]
    NotInitialized,

    /// The underlying storage medium failed.
    #[error("storage i/o error: {0}")]
    Io(String),

    /// Different bytes were written under an existing block id.
    #[error("integrity fault: conflicting bytes for block {}", id_to_hex(.0))]
    Integrity(BlockId),

    /// Stored bytes could not be decoded.
    #[error("corrupt stored record: {0}")]
    Corrupt(ChainError),

    /// The store has been closed.
    #[error("store is closed")]
    Closed,

    /// `close` was called with staged writes that were never committed.
    #[error("{0} uncommitted writes pending")]
    UncommittedWrites(usize),
}

impl From<fjall::Error> for StoreError {
    fn from(err: fjall::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Convenience result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
