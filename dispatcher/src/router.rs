//! Connection ownership tables for the router.
//!
//! Two small registries back the network-event boundary: a fixed-size
//! listen-port table mapping open ports to owning processes, and a tag
//! table mapping live connections to their owner plus an opaque user state.

use core_types::{ConnectionId, ProcessId};
use kernel_api::{ConnectionState, DispatchError};
use std::collections::HashMap;

/// One reserved slot in the listen-port table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenPortEntry {
    pub port: u16,
    pub owner: ProcessId,
}

/// Ownership tag of a live connection
struct ConnectionTag {
    owner: ProcessId,
    state: Option<ConnectionState>,
}

/// Listen-port and connection-ownership tables
///
/// Every live connection has exactly one owning process; at most one owner
/// per open port. Opening the same port from two processes without closing
/// it in between is caller misuse and is not defended against.
pub struct ConnectionRouter {
    slots: Vec<Option<ListenPortEntry>>,
    tags: HashMap<ConnectionId, ConnectionTag>,
}

impl ConnectionRouter {
    /// Creates a router with the given number of listen-port slots.
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            tags: HashMap::new(),
        }
    }

    /// Reserves the first free slot for `port`, owned by `owner`.
    pub fn reserve(&mut self, port: u16, owner: ProcessId) -> Result<(), DispatchError> {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(ListenPortEntry { port, owner });
                Ok(())
            }
            None => Err(DispatchError::ListenTableFull),
        }
    }

    /// Returns the process listening on `port`, if any.
    pub fn owner_of_port(&self, port: u16) -> Option<ProcessId> {
        self.slots
            .iter()
            .flatten()
            .find(|entry| entry.port == port)
            .map(|entry| entry.owner)
    }

    /// Frees every slot owned by `owner`, returning the reclaimed ports.
    pub fn release_owned(&mut self, owner: ProcessId) -> Vec<u16> {
        let mut released = Vec::new();
        for slot in self.slots.iter_mut() {
            if let Some(entry) = slot {
                if entry.owner == owner {
                    released.push(entry.port);
                    *slot = None;
                }
            }
        }
        released
    }

    /// Returns the number of reserved slots.
    pub fn reserved_slots(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Tags a connection with an owner and a user state, replacing any
    /// previous tag.
    pub fn tag(&mut self, conn: ConnectionId, owner: ProcessId, state: Option<ConnectionState>) {
        self.tags.insert(conn, ConnectionTag { owner, state });
    }

    /// Returns the owner a connection is tagged with, if any.
    pub fn tag_owner(&self, conn: ConnectionId) -> Option<ProcessId> {
        self.tags.get(&conn).map(|tag| tag.owner)
    }

    /// Returns the user state attached to a connection, if any.
    pub fn conn_state(&self, conn: ConnectionId) -> Option<ConnectionState> {
        self.tags.get(&conn).and_then(|tag| tag.state.clone())
    }

    /// Drops the tag of a connection that is going away.
    pub fn remove_tag(&mut self, conn: ConnectionId) {
        self.tags.remove(&conn);
    }
}
