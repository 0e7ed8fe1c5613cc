//! Shared helpers for chain controller integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tsvm_primitives::Block;
use tsvm_store::{BatchEntry, Database, MemDb, StoreError, StoreResult};
use tsvm_vm::{ChainVm, Message, MockClock, Notifier, TimestampVm};

pub const START_TIME: u64 = 1_700_000_000;

/// A VM over `db` with a controllable clock and the engine's receiver.
pub struct Harness<D: Database> {
    pub vm: TimestampVm<D>,
    pub clock: Arc<MockClock>,
    pub rx: Receiver<Message>,
}

pub fn harness<D: Database>(db: D) -> Harness<D> {
    let (notifier, rx) = Notifier::channel();
    let clock = Arc::new(MockClock::new(START_TIME));
    let vm = TimestampVm::with_clock(db, notifier, Box::new(clock.clone()));
    Harness { vm, clock, rx }
}

/// A fresh in-memory VM, initialized with `genesis`.
pub fn initialized(genesis: &[u8]) -> Harness<MemDb> {
    let mut h = harness(MemDb::new());
    h.vm.initialize(genesis).expect("initialize");
    h
}

impl<D: Database> Harness<D> {
    /// Number of signals waiting in the engine's slot.
    pub fn drain_signals(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Propose, build, verify, and accept one block.
    pub fn produce(&mut self, data: &[u8]) -> Block {
        self.vm.propose_payload(data).expect("propose");
        let mut block = self.vm.build_block().expect("build");
        self.vm.verify_block(&block).expect("verify");
        self.vm.accept_block(&mut block).expect("accept");
        block
    }
}

/// A `MemDb` whose batch writes fail while `fail` is set.
#[derive(Debug, Clone, Default)]
pub struct FailingDb {
    pub inner: MemDb,
    pub fail: Arc<AtomicBool>,
}

impl FailingDb {
    pub fn failing() -> Self {
        let db = Self::default();
        db.set_failing(true);
        db
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Database for FailingDb {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn write_batch(&mut self, batch: Vec<BatchEntry>) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Io("injected write failure".into()));
        }
        self.inner.write_batch(batch)
    }
}
