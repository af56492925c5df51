//! The network-engine boundary
//!
//! The TCP/IP engine itself is an external collaborator. It calls the
//! dispatcher's connection router once per connection event and honors the
//! instructions the router gives back through the [`NetworkEngine`] trait.

use core_types::ConnectionId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::rc::Rc;

/// Remote endpoint (address + port) for outbound connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

/// What happened on a connection
///
/// The engine's event vocabulary. The router interprets only `Connected`
/// (to tag accepted connections with their listening owner); everything
/// else passes through to the owning process's connection handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEventKind {
    /// The connection was newly established on the given local port
    Connected { local_port: u16 },
    /// New inbound data is available
    NewData,
    /// Previously sent data was acknowledged
    Acked,
    /// The remote end closed the connection
    Closed,
    /// The connection was aborted
    Aborted,
    /// The connection timed out
    TimedOut,
    /// Periodic poll; the process may send now
    Poll,
}

/// Opaque per-connection user state
///
/// Attached with `markconn` (or cleared when an accepted connection is
/// tagged) and handed back to the owner on every event.
pub type ConnectionState = Rc<dyn Any>;

/// A connection event as delivered to the owning process
#[derive(Clone)]
pub struct ConnectionEvent {
    pub conn: ConnectionId,
    pub kind: ConnectionEventKind,
    /// The per-connection user state, if one was attached
    pub state: Option<ConnectionState>,
}

/// The collaborator contract of the TCP/IP engine
///
/// The dispatcher issues these instructions; the engine carries them out.
/// All calls are synchronous and single-threaded like everything else in
/// the kernel.
pub trait NetworkEngine {
    /// Begin accepting connections on a local port
    fn listen(&mut self, port: u16);

    /// Stop accepting connections on a local port
    fn unlisten(&mut self, port: u16);

    /// Open an outbound connection, returning its id if one could be
    /// allocated
    fn connect(&mut self, endpoint: &Endpoint) -> Option<ConnectionId>;

    /// Abort a connection whose owner can no longer be reached
    fn abort(&mut self, conn: ConnectionId);
}
