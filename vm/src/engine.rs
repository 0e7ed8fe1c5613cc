//! The capability set a consensus engine uses to drive the VM.
//!
//! The engine owns ordering, voting, and conflict resolution. The VM only
//! answers these calls and raises [`Message::PendingTxs`](crate::Message)
//! through the notifier it was built with. How the engine reaches the VM
//! (in-process, over a plugin boundary) is not this trait's concern.

use tsvm_primitives::{Block, BlockId};

use crate::error::VmResult;

/// Lifecycle phase reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The engine is catching up with the network.
    Bootstrapping,
    /// The engine is following consensus normally.
    NormalOp,
}

/// Operations the consensus engine may invoke on a chain VM.
///
/// Calls are sequential for a given VM instance.
pub trait ChainVm {
    /// Create and accept genesis on first run, or recover the last accepted
    /// block on restart. Sets the preference to the last accepted block.
    fn initialize(&mut self, genesis_data: &[u8]) -> VmResult<()>;

    /// Queue a payload for a future block and signal pending work.
    fn propose_payload(&mut self, data: &[u8]) -> VmResult<()>;

    /// Build a block from the oldest pending payload on top of the preference.
    ///
    /// The block is not cached; pass it to [`verify_block`](Self::verify_block).
    fn build_block(&mut self) -> VmResult<Block>;

    /// Decode a block received from elsewhere, returning the already-known
    /// instance if one exists.
    fn parse_block(&self, bytes: &[u8]) -> VmResult<Block>;

    /// Look up a block in the verified cache, then in the store.
    fn get_block(&self, id: &BlockId) -> VmResult<Block>;

    /// Verify a block and cache it until it is decided.
    fn verify_block(&mut self, block: &Block) -> VmResult<()>;

    /// Accept a block: persist it and make it the last accepted block and
    /// the preference. The block must be a valid child of the current last
    /// accepted block. Accepting an accepted block is a no-op.
    fn accept_block(&mut self, block: &mut Block) -> VmResult<()>;

    /// Reject a block: drop it from the cache. Nothing is persisted.
    fn reject_block(&mut self, block: &mut Block) -> VmResult<()>;

    /// Set the block the next built block will extend.
    fn set_preference(&mut self, id: BlockId) -> VmResult<()>;

    /// Id of the most recently accepted block.
    fn last_accepted(&self) -> VmResult<BlockId>;

    /// Record the engine's lifecycle phase.
    fn set_state(&mut self, state: EngineState) -> VmResult<()>;

    /// Succeeds while the VM can serve requests.
    fn health_check(&self) -> VmResult<()>;

    /// Release the store. Safe to call more than once.
    fn shutdown(&mut self) -> VmResult<()>;

    /// VM version string.
    fn version(&self) -> &'static str;
}
