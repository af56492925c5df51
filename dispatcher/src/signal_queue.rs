//! Bounded signal queue.
//!
//! Deterministic FIFO ordering with an explicit capacity limit; insertion
//! order is delivery order.

use core_types::{SignalData, SignalId, SignalTarget};
use std::collections::VecDeque;

/// Queue error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    Full,
}

/// A pending signal awaiting delivery.
#[derive(Clone)]
pub struct QueuedSignal {
    pub signal: SignalId,
    pub data: SignalData,
    pub target: SignalTarget,
}

/// Bounded FIFO queue of pending signals.
pub struct SignalQueue {
    capacity: usize,
    entries: VecDeque<QueuedSignal>,
}

impl SignalQueue {
    /// Creates a queue with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of pending signals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns remaining capacity.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len())
    }

    /// Appends a pending signal.
    ///
    /// A full queue rejects the push and is left unchanged; nothing is
    /// overwritten or dropped to make room.
    pub fn push(&mut self, entry: QueuedSignal) -> Result<(), QueueError> {
        if self.entries.len() >= self.capacity {
            return Err(QueueError::Full);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// Pops the oldest pending signal.
    pub fn pop(&mut self) -> Option<QueuedSignal> {
        self.entries.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{no_data, signal_data};

    fn entry(raw: u16) -> QueuedSignal {
        QueuedSignal {
            signal: SignalId::from_raw(raw),
            data: no_data(),
            target: SignalTarget::Broadcast,
        }
    }

    #[test]
    fn test_queue_ordering() {
        let mut queue = SignalQueue::with_capacity(4);
        queue.push(entry(1)).unwrap();
        queue.push(entry(2)).unwrap();
        queue.push(entry(3)).unwrap();

        assert_eq!(queue.pop().unwrap().signal, SignalId::from_raw(1));
        assert_eq!(queue.pop().unwrap().signal, SignalId::from_raw(2));
        assert_eq!(queue.pop().unwrap().signal, SignalId::from_raw(3));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_queue_capacity() {
        let mut queue = SignalQueue::with_capacity(2);
        queue.push(entry(1)).unwrap();
        queue.push(entry(2)).unwrap();
        assert!(matches!(queue.push(entry(3)), Err(QueueError::Full)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.remaining_capacity(), 0);

        // The rejected push left the order intact.
        assert_eq!(queue.pop().unwrap().signal, SignalId::from_raw(1));
        assert_eq!(queue.pop().unwrap().signal, SignalId::from_raw(2));
    }

    #[test]
    fn test_queue_payload_preserved() {
        let mut queue = SignalQueue::with_capacity(1);
        queue
            .push(QueuedSignal {
                signal: SignalId::from_raw(5),
                data: signal_data(99u32),
                target: SignalTarget::Broadcast,
            })
            .unwrap();

        let popped = queue.pop().unwrap();
        assert_eq!(popped.data.downcast_ref::<u32>(), Some(&99));
    }
}
