//! `tsvm-store`: durable chain state for the timestamp VM.
//!
//! This crate provides:
//!
//! - `Database` trait: raw key-value backend with atomic batch writes
//! - `MemDb`: in-memory `Database` for tests
//! - `FjallDb`: on-disk `Database` backed by fjall
//! - `WriteBuffer`: uncommitted writes layered over a backend
//! - `ChainState`: the accepted chain: blocks, last-accepted pointer,
//!   and the one-time initialized marker
//! - `StoreError`: storage error type

pub mod error;
pub mod database;
pub mod mem_db;
pub mod fjall_db;
pub mod write_buffer;
pub mod chain_state;

// Re-export commonly used types at the crate root.
pub use error::{StoreError, StoreResult};
pub use database::{BatchEntry, Database};
pub use mem_db::MemDb;
pub use fjall_db::FjallDb;
pub use write_buffer::WriteBuffer;
pub use chain_state::ChainState;
