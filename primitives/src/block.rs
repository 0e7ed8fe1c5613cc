//! Block entity and its lifecycle state machine.
//!
//! A block is content-addressed: its identifier is the hash of its encoded
//! bytes, which are produced once at construction and never re-derived.
//! Everything except `status` is immutable after construction.
//!
//! ```text
//! Processing ──► Accepted
//!      │
//!      └───────► Rejected
//! ```

use alloc::vec::Vec;
use core::fmt;

use crate::codec::{decode_block, encode_block};
use crate::crypto::block_id;
use crate::error::{ChainError, ChainResult};
use crate::types::{
    pad_payload, BlockHeight, BlockId, Payload, Timestamp, EMPTY_ID, GENESIS_HEIGHT,
    GENESIS_TIMESTAMP,
};

/// Lifecycle status of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Known but not yet decided by consensus.
    Processing = 0,
    /// Finalized. Terminal.
    Accepted = 1,
    /// Dropped by consensus. Terminal.
    Rejected = 2,
}

impl Status {
    /// Returns true for `Accepted` and `Rejected`.
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The serialized fields of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContents {
    /// Identifier of the block this one extends.
    pub parent_id: BlockId,
    /// Height in the chain (parent height + 1).
    pub height: BlockHeight,
    /// Production time in seconds since the epoch.
    pub timestamp: Timestamp,
    /// Zero-padded opaque data.
    pub payload: Payload,
}

/// A block of the timestamp chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    contents: BlockContents,
    status: Status,
    bytes: Vec<u8>,
}

impl Block {
    /// Build a new `Processing` block from a fixed-size payload.
    pub fn new(
        parent_id: BlockId,
        height: BlockHeight,
        payload: Payload,
        timestamp: Timestamp,
    ) -> Self {
        let contents = BlockContents {
            parent_id,
            height,
            timestamp,
            payload,
        };
        let bytes = encode_block(&contents);
        Self {
            id: block_id(&bytes),
            contents,
            status: Status::Processing,
            bytes,
        }
    }

    /// Build a new `Processing` block, zero-padding `data`.
    ///
    /// Fails with `PayloadTooLong` if `data` exceeds the payload length.
    pub fn with_data(
        parent_id: BlockId,
        height: BlockHeight,
        data: &[u8],
        timestamp: Timestamp,
    ) -> ChainResult<Self> {
        Ok(Self::new(parent_id, height, pad_payload(data)?, timestamp))
    }

    /// Build the genesis block: empty parent, height 0, epoch timestamp.
    pub fn genesis(data: &[u8]) -> ChainResult<Self> {
        Self::with_data(EMPTY_ID, GENESIS_HEIGHT, data, GENESIS_TIMESTAMP)
    }

    /// Decode a block from its encoded bytes. The result is `Processing`.
    pub fn parse(bytes: &[u8]) -> ChainResult<Self> {
        let contents = decode_block(bytes)?;
        Ok(Self {
            id: block_id(bytes),
            contents,
            status: Status::Processing,
            bytes: bytes.to_vec(),
        })
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn parent_id(&self) -> BlockId {
        self.contents.parent_id
    }

    pub fn height(&self) -> BlockHeight {
        self.contents.height
    }

    pub fn timestamp(&self) -> Timestamp {
        self.contents.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.contents.payload
    }

    pub fn contents(&self) -> &BlockContents {
        &self.contents
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The cached encoded bytes this block's identifier is derived from.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_genesis(&self) -> bool {
        self.contents.parent_id == EMPTY_ID && self.contents.height == GENESIS_HEIGHT
    }

    /// Check whether moving to `to` is allowed without changing anything.
    ///
    /// Returns `Ok(true)` if the status would change, `Ok(false)` if the
    /// block already has status `to`, and `InvalidTransition` otherwise.
    pub fn check_transition(&self, to: Status) -> ChainResult<bool> {
        match (self.status, to) {
            (from, to) if from == to => Ok(false),
            (Status::Processing, Status::Accepted | Status::Rejected) => Ok(true),
            (from, to) => Err(ChainError::InvalidTransition { from, to }),
        }
    }

    /// Move the block to `to`, following [`check_transition`](Self::check_transition).
    pub fn transition(&mut self, to: Status) -> ChainResult<bool> {
        let changed = self.check_transition(to)?;
        if changed {
            self.status = to;
        }
        Ok(changed)
    }

    /// Tag a block loaded from durable storage as `Accepted`.
    ///
    /// Only accepted blocks are ever persisted, so a decoded stored block is
    /// finalized by definition even though decoding yields `Processing`.
    pub fn into_accepted(mut self) -> Self {
        self.status = Status::Accepted;
        self
    }
}
