//! FIFO of payloads waiting to be put into a block.

use std::collections::VecDeque;

use tsvm_primitives::Payload;

/// Pending payloads, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    queue: VecDeque<Payload>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload at the back.
    pub fn push(&mut self, payload: Payload) {
        self.queue.push_back(payload);
    }

    /// Return a payload to the front, ahead of everything queued.
    pub fn push_front(&mut self, payload: Payload) {
        self.queue.push_front(payload);
    }

    /// Take the oldest payload.
    pub fn pop(&mut self) -> Option<Payload> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut pool = Mempool::new();
        pool.push([1; 32]);
        pool.push([2; 32]);
        pool.push([3; 32]);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.pop(), Some([1; 32]));
        assert_eq!(pool.pop(), Some([2; 32]));
        assert_eq!(pool.pop(), Some([3; 32]));
        assert_eq!(pool.pop(), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_push_front_goes_first() {
        let mut pool = Mempool::new();
        pool.push([2; 32]);
        pool.push_front([1; 32]);
        assert_eq!(pool.pop(), Some([1; 32]));
        assert_eq!(pool.pop(), Some([2; 32]));
    }
}
