//! Block-level error types for the timestamp VM.

use alloc::string::String;
use core::fmt;

use crate::block::Status;

/// Errors raised while constructing, decoding, or transitioning a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Payload is longer than the fixed payload length.
    PayloadTooLong { len: usize, max: usize },

    /// Encoded block bytes are malformed.
    Codec(String),

    /// Encoded block carries a codec version this build does not know.
    UnsupportedCodecVersion(u16),

    /// Status change out of a terminal state into a different one.
    InvalidTransition { from: Status, to: Status },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLong { len, max } => {
                write!(f, "payload too long: {} bytes (max {})", len, max)
            }
            Self::Codec(msg) => write!(f, "codec error: {}", msg),
            Self::UnsupportedCodecVersion(v) => write!(f, "unsupported codec version: {}", v),
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid status transition: {} -> {}", from, to)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ChainError {}

/// Convenience result type for block operations.
pub type ChainResult<T> = core::result::Result<T, ChainError>;
