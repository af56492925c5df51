//! Signal identifiers, targets, payloads and subscription sets

use crate::ProcessId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Kernel-routed event identifier
///
/// Signal numbers are allocated once per kernel lifetime, monotonically,
/// and never reused. The raw value zero is reserved as [`SignalId::NONE`];
/// emitting it is a deliberate no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalId(u16);

impl SignalId {
    /// The reserved "no signal" value
    pub const NONE: SignalId = SignalId(0);

    /// Creates a signal id from a raw allocator value
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw signal number
    pub fn as_raw(&self) -> u16 {
        self.0
    }

    /// Returns whether this is the reserved "no signal" value
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sig({})", self.0)
    }
}

/// Delivery target of an emitted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTarget {
    /// Every process listening for the signal
    Broadcast,
    /// A single process, matched by id
    Process(ProcessId),
}

impl SignalTarget {
    /// Returns whether a process with the given id is addressed by this target
    pub fn matches(&self, id: ProcessId) -> bool {
        match self {
            SignalTarget::Broadcast => true,
            SignalTarget::Process(target) => *target == id,
        }
    }
}

/// Opaque signal payload
///
/// Every receiver of one delivery observes the same payload. Handlers
/// downcast to the concrete type they agreed on with the emitter.
pub type SignalData = Rc<dyn Any>;

/// Wraps a value as a signal payload.
pub fn signal_data<T: 'static>(value: T) -> SignalData {
    Rc::new(value)
}

/// The empty signal payload.
pub fn no_data() -> SignalData {
    Rc::new(())
}

/// Fixed-width set of signals a process listens for
///
/// Sized at construction from the configured maximum signal count and never
/// resized. Subscriptions are monotonic for the life of the process; there
/// is no unsubscribe operation.
#[derive(Debug, Clone)]
pub struct SubscriptionSet {
    bits: Vec<u64>,
    width: usize,
}

impl SubscriptionSet {
    /// Creates an empty set able to hold signals with raw values up to
    /// and including `max_signals`.
    pub fn new(max_signals: usize) -> Self {
        let words = max_signals / 64 + 1;
        Self {
            bits: vec![0; words],
            width: max_signals,
        }
    }

    /// Marks a signal as subscribed. Out-of-range or reserved ids are ignored.
    pub fn subscribe(&mut self, signal: SignalId) {
        let raw = signal.as_raw() as usize;
        if raw == 0 || raw > self.width {
            return;
        }
        self.bits[raw / 64] |= 1u64 << (raw % 64);
    }

    /// Returns whether the signal is subscribed
    pub fn contains(&self, signal: SignalId) -> bool {
        let raw = signal.as_raw() as usize;
        if raw == 0 || raw > self.width {
            return false;
        }
        self.bits[raw / 64] >> (raw % 64) & 1 == 1
    }

    /// Returns the number of subscribed signals
    pub fn len(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns whether no signal is subscribed
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|word| *word == 0)
    }
}
