//! Chain controller error types.

use tsvm_primitives::{id_to_hex, BlockId, ChainError};
use tsvm_store::StoreError;

/// Top-level error type for the chain controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// Genesis payload is longer than the fixed payload length.
    #[error("genesis data should be bytes (max length {max}), got {len}")]
    BadGenesisData { len: usize, max: usize },

    /// Proposed payload is longer than the fixed payload length.
    #[error("payload too long: {len} bytes (max {max})")]
    BadPayload { len: usize, max: usize },

    /// `build_block` was called with an empty mempool.
    #[error("there is no block to propose")]
    NoPendingWork,

    /// The preferred or referenced parent block cannot be resolved.
    #[error("couldn't get parent block {}", id_to_hex(.0))]
    MissingParent(BlockId),

    /// Lookup miss in both the verified cache and the store.
    #[error("block {} not found", id_to_hex(.0))]
    NotFound(BlockId),

    /// Block failed verification.
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    /// Block bytes could not be decoded.
    #[error("codec error: {0}")]
    Codec(ChainError),

    /// Accept/reject on a block already decided the other way.
    #[error("invalid transition: {0}")]
    InvalidTransition(ChainError),

    /// Durable store failure.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Malformed request at the service adapter.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl VmError {
    /// Errors that indicate corruption or a logic fault rather than a
    /// condition the caller can wait out.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::BadGenesisData { .. }
                | Self::MissingParent(_)
                | Self::InvalidTransition(_)
                | Self::Store(_)
        )
    }
}

impl From<StoreError> for VmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

impl From<ChainError> for VmError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidTransition { .. } => Self::InvalidTransition(err),
            ChainError::PayloadTooLong { len, max } => Self::BadPayload { len, max },
            other => Self::Codec(other),
        }
    }
}

/// Convenience result type for the chain controller.
pub type VmResult<T> = Result<T, VmError>;
