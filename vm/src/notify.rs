//! Pending-work signal from the VM to the consensus engine.
//!
//! A one-slot channel: sending never blocks, and a signal raised while an
//! earlier one is still undrained is dropped. The signal means "at least one
//! payload is pending", so coalescing loses nothing. The receiving half may
//! live on another thread.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use tracing::{debug, warn};

/// Messages from the VM to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// There is pending data to build a block from.
    PendingTxs,
}

/// Sending half of the engine channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    to_engine: SyncSender<Message>,
}

impl Notifier {
    /// Wrap an engine-supplied sender.
    pub fn new(to_engine: SyncSender<Message>) -> Self {
        Self { to_engine }
    }

    /// Create a coalescing channel of depth one.
    pub fn channel() -> (Self, Receiver<Message>) {
        let (tx, rx) = mpsc::sync_channel(1);
        (Self::new(tx), rx)
    }

    /// Signal pending work. Returns whether the signal was delivered.
    pub fn notify(&self) -> bool {
        match self.to_engine.try_send(Message::PendingTxs) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("dropping message to consensus engine");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("consensus engine receiver is gone");
                false
            }
        }
    }
}
