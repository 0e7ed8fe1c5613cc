//! Core type aliases and constants for the timestamp VM.

use alloc::string::String;
use crate::error::{ChainError, ChainResult};

/// Fixed length of a block payload in bytes.
pub const DATA_LEN: usize = 32;

/// 32-byte content identifier of a block (SHA-256 of its encoded bytes).
pub type BlockId = [u8; 32];

/// Fixed-size opaque block payload.
pub type Payload = [u8; DATA_LEN];

/// Block height. Genesis is 0, every child is `parent + 1`.
pub type BlockHeight = u64;

/// Whole seconds since the Unix epoch.
pub type Timestamp = u64;

/// The empty identifier. Only the genesis block has it as parent.
pub const EMPTY_ID: BlockId = [0u8; 32];

/// Height of the genesis block.
pub const GENESIS_HEIGHT: BlockHeight = 0;

/// Timestamp of the genesis block (the epoch itself).
pub const GENESIS_TIMESTAMP: Timestamp = 0;

/// Convert a `BlockId` to a hex string for display purposes.
pub fn id_to_hex(id: &BlockId) -> String {
    let mut s = String::with_capacity(64);
    for byte in id {
        use core::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

/// Copy `data` into a zero-padded fixed-size payload.
///
/// Fails with `PayloadTooLong` if `data` is longer than [`DATA_LEN`].
pub fn pad_payload(data: &[u8]) -> ChainResult<Payload> {
    if data.len() > DATA_LEN {
        return Err(ChainError::PayloadTooLong {
            len: data.len(),
            max: DATA_LEN,
        });
    }
    let mut payload = [0u8; DATA_LEN];
    payload[..data.len()].copy_from_slice(data);
    Ok(payload)
}
