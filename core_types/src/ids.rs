//! Unique identifiers for kernel entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a process
///
/// Processes are cooperative tasks registered with the dispatcher. Ids are
/// drawn from a wrapping counter and are unique among the processes alive at
/// any instant; zero is never assigned, and "no process" is expressed as
/// `Option<ProcessId>` rather than a reserved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(u16);

impl ProcessId {
    /// Creates a process id from a raw counter value.
    ///
    /// Callers must not pass zero; the dispatcher's allocator skips it.
    pub fn from_raw(raw: u16) -> Self {
        debug_assert!(raw != 0, "process id zero is never assigned");
        Self(raw)
    }

    /// Returns the raw id value
    pub fn as_raw(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proc({})", self.0)
    }
}

/// Unique identifier for a live network connection
///
/// Minted by the network engine when a connection is established or
/// initiated. The dispatcher treats it as opaque; it only keys the
/// connection tag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a connection ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conn({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_roundtrip() {
        let id = ProcessId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
        assert_eq!(id, ProcessId::from_raw(7));
        assert_ne!(id, ProcessId::from_raw(8));
    }

    #[test]
    fn test_process_id_display() {
        let id = ProcessId::from_raw(42);
        assert_eq!(format!("{}", id), "Proc(42)");
    }

    #[test]
    fn test_connection_id_creation() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_connection_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = ConnectionId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("Conn("));
    }
}
