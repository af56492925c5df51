//! Dispatch Audit Trail
//!
//! This module provides audit logging for dispatcher operations in
//! test/simulation mode. It tracks process lifecycle, signal flow and
//! connection routing for verification in tests.
//!
//! ## Philosophy
//!
//! - Test-only: this is NOT production logging, it's for test verification
//! - Deterministic: events are recorded in order, stamped with the
//!   scheduler tick at which they occurred
//! - Queryable: tests assert on the trail to verify delivery and routing
//!   properties

use core_types::{ConnectionId, ProcessId, SignalId, SignalTarget};
use serde::{Deserialize, Serialize};

/// A dispatcher event worth recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEvent {
    /// A process was registered and assigned an id
    ProcessStarted { id: ProcessId, name: String },
    /// A process exited and was removed from the registry
    ProcessExited { id: ProcessId },
    /// A signal number was allocated
    SignalAllocated { signal: SignalId },
    /// A process subscribed to a signal
    Subscribed { id: ProcessId, signal: SignalId },
    /// A signal was appended to the queue
    SignalQueued { signal: SignalId, target: SignalTarget },
    /// A signal handler was invoked
    SignalDelivered { signal: SignalId, to: ProcessId },
    /// A listen-port slot was reserved
    ListenPortOpened { port: u16, owner: ProcessId },
    /// A listen-port slot was released at process exit
    ListenPortReleased { port: u16, owner: ProcessId },
    /// A connection was tagged with an owning process
    ConnectionTagged { conn: ConnectionId, owner: ProcessId },
    /// A connection event was handed to its owner
    ConnectionDelivered { conn: ConnectionId, to: ProcessId },
    /// A connection with no reachable owner was aborted
    ConnectionAborted { conn: ConnectionId },
}

/// A single audit event with the tick at which it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchAuditEvent {
    /// Scheduler tick when the event occurred (0 before the first cycle)
    pub tick: u64,
    /// The dispatcher event that occurred
    pub event: DispatchEvent,
}

/// Audit log for dispatcher operations
///
/// Maintains a chronological record of kernel events for verification in
/// tests.
#[derive(Debug, Default)]
pub struct DispatchAuditLog {
    events: Vec<DispatchAuditEvent>,
}

impl DispatchAuditLog {
    /// Creates a new empty audit log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Records an event at the specified tick
    pub fn record(&mut self, tick: u64, event: DispatchEvent) {
        self.events.push(DispatchAuditEvent { tick, event });
    }

    /// Returns all recorded events
    pub fn events(&self) -> &[DispatchAuditEvent] {
        &self.events
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DispatchEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(&e.event)).count()
    }

    /// Checks if any event matches the predicate
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&DispatchEvent) -> bool,
    {
        self.events.iter().any(|e| predicate(&e.event))
    }

    /// Clears all events (useful for test reset)
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks if the audit log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
