//! `tsvm-primitives`: foundational types for the timestamp VM.
//!
//! This crate provides the block entity and its lifecycle state machine,
//! identifier and payload types, the deterministic block codec, and the
//! block-level error type shared by the store and the chain controller.
//!
//! Supports `#![no_std]` (use `default-features = false`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod types;
pub mod error;
pub mod crypto;
pub mod codec;
pub mod block;

// Re-export commonly used types at the crate root for convenience.
pub use types::{
    id_to_hex, pad_payload, BlockHeight, BlockId, Payload, Timestamp, DATA_LEN, EMPTY_ID,
    GENESIS_HEIGHT, GENESIS_TIMESTAMP,
};
pub use error::{ChainError, ChainResult};
pub use block::{Block, BlockContents, Status};
