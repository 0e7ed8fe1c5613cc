//! The timestamp chain controller.
//!
//! `TimestampVm` owns everything that is not yet final: the mempool, the
//! arena of verified-but-undecided blocks, and the preferred tip. Final data
//! lives in the [`ChainState`]. A block moves out of the arena exactly when
//! it is decided: into the store on accept, nowhere on reject.
//!
//! Genesis bootstrap on first run:
//!
//! 1. build the genesis block (empty parent, height 0, epoch timestamp)
//! 2. stage it and the last-accepted pointer
//! 3. stage the initialized marker
//! 4. commit once
//!
//! A crash before step 4 leaves the store as if genesis never ran.

use std::collections::HashMap;

use tracing::{debug, error, info};
use tsvm_primitives::{id_to_hex, pad_payload, Block, BlockId, Status, DATA_LEN};
use tsvm_store::{ChainState, Database};

use crate::clock::{Clock, SystemClock};
use crate::engine::{ChainVm, EngineState};
use crate::error::{VmError, VmResult};
use crate::mempool::Mempool;
use crate::notify::Notifier;
use crate::validation::verify_child;

/// Name the VM registers under.
pub const NAME: &str = "timestampvm";

/// VM version, taken from the package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A chain whose blocks carry a timestamp and a 32-byte payload.
pub struct TimestampVm<D: Database> {
    state: ChainState<D>,
    to_engine: Notifier,
    clock: Box<dyn Clock>,
    mempool: Mempool,
    /// Blocks that passed verification but are not yet accepted or rejected.
    verified_blocks: HashMap<BlockId, Block>,
    preferred: BlockId,
    bootstrapped: bool,
}

impl<D: Database> TimestampVm<D> {
    /// Create a VM over `db` that signals the engine through `to_engine`.
    ///
    /// Call [`ChainVm::initialize`] before anything else.
    pub fn new(db: D, to_engine: Notifier) -> Self {
        Self::with_clock(db, to_engine, Box::new(SystemClock))
    }

    /// Like [`new`](Self::new), with a custom time source.
    pub fn with_clock(db: D, to_engine: Notifier, clock: Box<dyn Clock>) -> Self {
        Self {
            state: ChainState::new(db),
            to_engine,
            clock,
            mempool: Mempool::new(),
            verified_blocks: HashMap::new(),
            preferred: tsvm_primitives::EMPTY_ID,
            bootstrapped: false,
        }
    }

    /// The block the next built block will extend.
    pub fn preferred(&self) -> BlockId {
        self.preferred
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn mempool_len(&self) -> usize {
        self.mempool.len()
    }

    /// Number of verified blocks awaiting a decision.
    pub fn verified_len(&self) -> usize {
        self.verified_blocks.len()
    }

    pub fn is_verified(&self, id: &BlockId) -> bool {
        self.verified_blocks.contains_key(id)
    }

    pub fn state(&self) -> &ChainState<D> {
        &self.state
    }

    /// Give back the backend, discarding all transient state.
    pub fn into_db(self) -> D {
        self.state.into_inner()
    }

    /// Tell the engine a block is ready to be built.
    pub fn notify_block_ready(&self) {
        self.to_engine.notify();
    }

    fn init_genesis(&mut self, genesis_data: &[u8]) -> VmResult<()> {
        if self.state.is_initialized()? {
            return Ok(());
        }

        if genesis_data.len() > DATA_LEN {
            return Err(VmError::BadGenesisData {
                len: genesis_data.len(),
                max: DATA_LEN,
            });
        }

        let mut genesis = Block::genesis(genesis_data)?;
        if let Err(err) = self.stage_genesis(&genesis) {
            error!(error = %err, "error while creating genesis block");
            self.state.abort();
            return Err(err);
        }
        self.finish_accept(&mut genesis)?;

        info!(id = %id_to_hex(&genesis.id()), "created genesis block");
        Ok(())
    }

    fn stage_genesis(&mut self, genesis: &Block) -> VmResult<()> {
        self.stage_accept(genesis)?;
        self.state.set_initialized()?;
        self.state.commit()?;
        Ok(())
    }

    /// Stage the writes accepting `block` implies, without committing.
    ///
    /// Returns `Ok(false)` if the block was already accepted.
    fn stage_accept(&mut self, block: &Block) -> VmResult<bool> {
        let id = block.id();
        let changed = block.check_transition(Status::Accepted).map_err(|err| {
            error!(id = %id_to_hex(&id), error = %err, "accept on decided block");
            VmError::from(err)
        })?;
        if !changed {
            return Ok(false);
        }

        if self.state.is_initialized()? {
            // Only a verified child of the last accepted block may extend
            // the chain.
            let parent = self.resolve_parent(&block.parent_id())?;
            verify_child(&parent, block)?;
            let last = self.state.get_last_accepted()?;
            if parent.id() != last {
                return Err(VmError::InvalidBlock(format!(
                    "parent {} is not the last accepted block {}",
                    id_to_hex(&parent.id()),
                    id_to_hex(&last)
                )));
            }
        }

        self.state.put_block(block)?;
        self.state.set_last_accepted(&id)?;
        Ok(true)
    }

    /// In-memory side of an accept, once the writes are durable.
    fn finish_accept(&mut self, block: &mut Block) -> VmResult<()> {
        block.transition(Status::Accepted)?;
        self.preferred = block.id();
        self.verified_blocks.remove(&block.id());
        Ok(())
    }

    fn resolve_parent(&self, id: &BlockId) -> VmResult<Block> {
        self.get_block(id).map_err(|err| match err {
            VmError::NotFound(id) => VmError::MissingParent(id),
            other => other,
        })
    }
}

impl<D: Database> ChainVm for TimestampVm<D> {
    fn initialize(&mut self, genesis_data: &[u8]) -> VmResult<()> {
        info!(version = VERSION, "initializing timestamp VM");

        self.init_genesis(genesis_data)?;

        let last_accepted = self.state.get_last_accepted()?;
        info!(id = %id_to_hex(&last_accepted), "initializing last accepted block");

        self.set_preference(last_accepted)
    }

    fn propose_payload(&mut self, data: &[u8]) -> VmResult<()> {
        let payload = pad_payload(data)?;
        self.mempool.push(payload);
        self.notify_block_ready();
        Ok(())
    }

    fn build_block(&mut self) -> VmResult<Block> {
        let payload = self.mempool.pop().ok_or(VmError::NoPendingWork)?;

        let built = self.resolve_parent(&self.preferred).and_then(|parent| {
            let height = parent
                .height()
                .checked_add(1)
                .ok_or_else(|| VmError::InvalidBlock("parent height overflow".into()))?;
            let block = Block::new(parent.id(), height, payload, self.clock.now());
            verify_child(&parent, &block)?;
            Ok(block)
        });

        match built {
            Ok(block) => {
                if !self.mempool.is_empty() {
                    self.notify_block_ready();
                }
                debug!(
                    id = %id_to_hex(&block.id()),
                    height = block.height(),
                    pending = self.mempool.len(),
                    "built block"
                );
                Ok(block)
            }
            Err(err) => {
                // Keep the payload at the head of the queue for the next attempt.
                self.mempool.push_front(payload);
                Err(err)
            }
        }
    }

    fn parse_block(&self, bytes: &[u8]) -> VmResult<Block> {
        let block = Block::parse(bytes)?;
        match self.get_block(&block.id()) {
            Ok(known) => Ok(known),
            Err(VmError::NotFound(_)) => Ok(block),
            Err(err) => Err(err),
        }
    }

    fn get_block(&self, id: &BlockId) -> VmResult<Block> {
        if let Some(block) = self.verified_blocks.get(id) {
            return Ok(block.clone());
        }
        Ok(self.state.get_block(id)?)
    }

    fn verify_block(&mut self, block: &Block) -> VmResult<()> {
        match block.status() {
            Status::Accepted => return Ok(()),
            Status::Rejected => {
                return Err(VmError::InvalidBlock("block was rejected".into()));
            }
            Status::Processing => {}
        }
        if self.state.has_block(&block.id())? {
            return Ok(());
        }

        let parent = self.resolve_parent(&block.parent_id())?;
        verify_child(&parent, block)?;

        self.verified_blocks.insert(block.id(), block.clone());
        debug!(
            id = %id_to_hex(&block.id()),
            height = block.height(),
            parent = %id_to_hex(&parent.id()),
            "verified block"
        );
        Ok(())
    }

    fn accept_block(&mut self, block: &mut Block) -> VmResult<()> {
        if block.status() == Status::Processing && self.state.has_block(&block.id())? {
            // Another instance of this block was already accepted.
            block.transition(Status::Accepted)?;
            self.verified_blocks.remove(&block.id());
            return Ok(());
        }

        let staged = self
            .stage_accept(block)
            .and_then(|changed| {
                if changed {
                    self.state.commit()?;
                }
                Ok(changed)
            });
        match staged {
            Ok(false) => Ok(()),
            Ok(true) => {
                self.finish_accept(block)?;
                info!(
                    id = %id_to_hex(&block.id()),
                    height = block.height(),
                    "accepted block"
                );
                Ok(())
            }
            Err(err) => {
                self.state.abort();
                Err(err)
            }
        }
    }

    fn reject_block(&mut self, block: &mut Block) -> VmResult<()> {
        let id = block.id();
        let mut changed = block.check_transition(Status::Rejected);
        if matches!(changed, Ok(true)) && self.state.has_block(&id)? {
            // Another instance of this block was already accepted.
            changed = Err(tsvm_primitives::ChainError::InvalidTransition {
                from: Status::Accepted,
                to: Status::Rejected,
            });
        }
        let changed = changed.map_err(|err| {
            error!(id = %id_to_hex(&id), error = %err, "reject on decided block");
            VmError::from(err)
        })?;

        self.verified_blocks.remove(&id);
        if changed {
            block.transition(Status::Rejected)?;
            debug!(id = %id_to_hex(&id), height = block.height(), "rejected block");
        }
        Ok(())
    }

    fn set_preference(&mut self, id: BlockId) -> VmResult<()> {
        self.preferred = id;
        Ok(())
    }

    fn last_accepted(&self) -> VmResult<BlockId> {
        Ok(self.state.get_last_accepted()?)
    }

    fn set_state(&mut self, state: EngineState) -> VmResult<()> {
        match state {
            EngineState::Bootstrapping => self.bootstrapped = false,
            EngineState::NormalOp => {
                if !self.bootstrapped {
                    self.bootstrapped = true;
                    info!("bootstrapping finished, entering normal operation");
                }
            }
        }
        Ok(())
    }

    fn health_check(&self) -> VmResult<()> {
        if self.state.is_closed() {
            return Err(VmError::Store(tsvm_store::StoreError::Closed));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> VmResult<()> {
        Ok(self.state.close()?)
    }

    fn version(&self) -> &'static str {
        VERSION
    }
}
