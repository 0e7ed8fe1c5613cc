//! `tsvm-vm`: the chain controller of the timestamp VM.
//!
//! A consensus engine drives this crate through the [`ChainVm`] capability
//! set: it asks for new blocks, hands back blocks received from peers, and
//! decides which blocks are accepted or rejected. The crate answers those
//! calls and tells the engine when pending work exists.
//!
//! ## Architecture
//!
//! - [`engine::ChainVm`]: the capability set the engine talks to
//! - [`vm::TimestampVm`]: the controller: mempool, verified-block arena,
//!   preference, genesis bootstrap, over a [`tsvm_store::ChainState`]
//! - [`notify::Notifier`]: one-slot coalescing pending-work signal
//! - [`mempool::Mempool`]: FIFO of payloads awaiting a block
//! - [`validation`]: parent linkage and height checks
//! - [`service::Service`]: thin request/reply adapter for outer surfaces

pub mod error;
pub mod clock;
pub mod notify;
pub mod mempool;
pub mod validation;
pub mod engine;
pub mod vm;
pub mod service;

pub use error::{VmError, VmResult};
pub use clock::{Clock, MockClock, SystemClock};
pub use notify::{Message, Notifier};
pub use mempool::Mempool;
pub use engine::{ChainVm, EngineState};
pub use vm::{TimestampVm, NAME, VERSION};
pub use service::{encode_payload, GetBlockReply, ProposeBlockReply, Service};
