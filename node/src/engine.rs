//! A single-node stand-in for the consensus engine.
//!
//! With one node there is nothing to vote on: every block the VM builds is
//! verified, preferred, and accepted straight away. The loop is driven by
//! the VM's pending-work signal, as a real engine would be.

use std::sync::mpsc::Receiver;

use tracing::debug;
use tsvm_primitives::Block;
use tsvm_store::Database;
use tsvm_vm::{ChainVm, EngineState, Message, TimestampVm, VmError, VmResult};

pub struct LocalEngine<D: Database> {
    vm: TimestampVm<D>,
    from_vm: Receiver<Message>,
}

impl<D: Database> LocalEngine<D> {
    pub fn new(vm: TimestampVm<D>, from_vm: Receiver<Message>) -> Self {
        Self { vm, from_vm }
    }

    pub fn vm(&self) -> &TimestampVm<D> {
        &self.vm
    }

    /// Bring the VM up: bootstrap over `genesis_data`, then normal operation.
    pub fn start(&mut self, genesis_data: &[u8]) -> VmResult<()> {
        self.vm.set_state(EngineState::Bootstrapping)?;
        self.vm.initialize(genesis_data)?;
        self.vm.set_state(EngineState::NormalOp)
    }

    /// Hand a payload to the VM.
    pub fn submit(&mut self, data: &[u8]) -> VmResult<()> {
        self.vm.propose_payload(data)
    }

    /// Build and accept blocks for as long as the VM signals pending work.
    ///
    /// Returns the accepted blocks in order.
    pub fn drain(&mut self) -> VmResult<Vec<Block>> {
        let mut accepted = Vec::new();
        while let Ok(Message::PendingTxs) = self.from_vm.try_recv() {
            loop {
                let mut block = match self.vm.build_block() {
                    Ok(block) => block,
                    Err(VmError::NoPendingWork) => break,
                    Err(err) => return Err(err),
                };
                self.vm.verify_block(&block)?;
                self.vm.set_preference(block.id())?;
                self.vm.accept_block(&mut block)?;
                accepted.push(block);
            }
        }
        debug!(accepted = accepted.len(), "drained pending work");
        Ok(accepted)
    }

    pub fn shutdown(&mut self) -> VmResult<()> {
        self.vm.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsvm_primitives::{Status, EMPTY_ID};
    use tsvm_store::{FjallDb, MemDb};
    use tsvm_vm::Notifier;

    fn engine<D: Database>(db: D) -> LocalEngine<D> {
        let (notifier, rx) = Notifier::channel();
        LocalEngine::new(TimestampVm::new(db, notifier), rx)
    }

    #[test]
    fn test_start_bootstraps() {
        let mut engine = engine(MemDb::new());
        engine.start(b"genesis").unwrap();
        assert!(engine.vm().is_bootstrapped());
        let genesis = engine.vm().get_block(&engine.vm().last_accepted().unwrap()).unwrap();
        assert_eq!(genesis.parent_id(), EMPTY_ID);
    }

    #[test]
    fn test_drain_accepts_in_order() {
        let mut engine = engine(MemDb::new());
        engine.start(&[]).unwrap();
        for data in [&b"a"[..], b"b", b"c"] {
            engine.submit(data).unwrap();
        }

        let accepted = engine.drain().unwrap();
        assert_eq!(accepted.len(), 3);
        for (i, block) in accepted.iter().enumerate() {
            assert_eq!(block.height(), i as u64 + 1);
            assert_eq!(block.status(), Status::Accepted);
        }
        assert_eq!(accepted[0].payload()[0], b'a');
        assert_eq!(accepted[2].payload()[0], b'c');
        assert_eq!(engine.vm().last_accepted().unwrap(), accepted[2].id());
        assert_eq!(engine.vm().verified_len(), 0);
    }

    #[test]
    fn test_drain_without_work() {
        let mut engine = engine(MemDb::new());
        engine.start(&[]).unwrap();
        assert!(engine.drain().unwrap().is_empty());
    }

    #[test]
    fn test_submit_too_long() {
        let mut engine = engine(MemDb::new());
        engine.start(&[]).unwrap();
        let err = engine.submit(&[0u8; 40]).unwrap_err();
        assert!(!err.is_fatal());
        assert!(engine.drain().unwrap().is_empty());
    }

    #[test]
    fn test_chain_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let tip = {
            let mut engine = engine(FjallDb::open(dir.path()).unwrap());
            engine.start(&[]).unwrap();
            engine.submit(b"persist").unwrap();
            let tip = engine.drain().unwrap().pop().unwrap();
            engine.shutdown().unwrap();
            tip
        };

        let mut engine = engine(FjallDb::open(dir.path()).unwrap());
        engine.start(&[]).unwrap();
        assert_eq!(engine.vm().last_accepted().unwrap(), tip.id());
        engine.submit(b"next").unwrap();
        let next = engine.drain().unwrap();
        assert_eq!(next[0].parent_id(), tip.id());
    }
}
