//! The dispatcher API trait

use crate::error::DispatchError;
use crate::net::{ConnectionState, Endpoint};
use crate::process::{ProcessDescriptor, ProcessHooks, ProcessInfo, ProcessState};
use core_types::{ConnectionId, ProcessId, SignalData, SignalId, SignalTarget};

/// The kernel API as seen by processes
///
/// This is the seam between processes and the dispatcher: handlers receive
/// `&mut dyn Dispatch` and call back through it, so process code never
/// names the concrete kernel type and re-entrant calls stay borrow-safe.
///
/// # Design Principles
///
/// **Cooperative and single-threaded**: nothing here blocks or suspends.
/// "Waiting" is returning to the scheduler loop and being called again on a
/// later cycle.
///
/// **Explicit construction**: processes are started with a descriptor,
/// their handler capabilities and their own state; nothing is forked or
/// inherited.
///
/// **Exhaustion is reported, not retried**: a full queue, an exhausted id
/// space or a full listen table come back as errors to the caller, which
/// owns the retry/drop decision.
pub trait Dispatch {
    /// Starts a new process
    ///
    /// Assigns a unique id, registers the process, makes it the current
    /// process, and auto-subscribes it to the quit signal. Must be called
    /// before the process uses any other dispatcher operation.
    ///
    /// Fails with [`DispatchError::NoIdAvailable`] when every candidate id
    /// collides with a live process.
    fn start(
        &mut self,
        descriptor: ProcessDescriptor,
        hooks: ProcessHooks,
        state: ProcessState,
    ) -> Result<ProcessId, DispatchError>;

    /// Exits the current process
    ///
    /// Releases every listen port the process owns (telling the network
    /// engine to stop listening on each), removes it from the registry and
    /// clears the current-process context. There is deliberately no way to
    /// exit another process: ask it to quit by emitting
    /// [`quit_signal`](Dispatch::quit_signal) at it instead, and let it
    /// clean up and call `exit` itself.
    fn exit(&mut self) -> Result<(), DispatchError>;

    /// Returns the id of the process currently in control, if any
    fn current(&self) -> Option<ProcessId>;

    /// Looks up a process by id
    ///
    /// Linear scan; returns `None` if no live process has the id.
    fn process(&self, id: ProcessId) -> Option<ProcessInfo>;

    /// The universal quit signal every process is subscribed to
    ///
    /// Receiving it is a request to clean up and call
    /// [`exit`](Dispatch::exit).
    fn quit_signal(&self) -> SignalId;

    /// The signal that prods the network engine's driver to flush pending
    /// work immediately
    fn poll_signal(&self) -> SignalId;

    /// Allocates the next unused signal number
    ///
    /// Signal numbers are monotonic and never reused; allocate once at
    /// module initialization, not per event. Fails with
    /// [`DispatchError::SignalLimitReached`] past the configured maximum.
    fn sigalloc(&mut self) -> Result<SignalId, DispatchError>;

    /// Subscribes the current process to a signal
    ///
    /// A silent no-op when no process is current. There is no unsubscribe:
    /// a process that stops caring must ignore the signal in its handler.
    fn listen(&mut self, signal: SignalId);

    /// Queues a signal for deferred delivery
    ///
    /// Returns immediately; the scheduler loop delivers the entry on a
    /// later cycle. Emitting [`SignalId::NONE`] is a deliberate no-op. A
    /// full queue rejects the emit with [`DispatchError::QueueFull`] and is
    /// left unchanged; nothing is overwritten, blocked on, or retried.
    fn emit(
        &mut self,
        signal: SignalId,
        data: SignalData,
        target: SignalTarget,
    ) -> Result<(), DispatchError>;

    /// Delivers a signal synchronously, bypassing the queue
    ///
    /// Every matching handler runs before this returns. The current-process
    /// context is saved first and restored afterwards, so nested synchronous
    /// delivery cannot leak the wrong context back to the caller. Costs more
    /// call-stack depth than [`emit`](Dispatch::emit); reserve it for
    /// effects that cannot wait one scheduler tick.
    fn fastemit(&mut self, signal: SignalId, data: SignalData, target: SignalTarget);

    /// Opens a local port for inbound connections, owned by the current
    /// process
    ///
    /// Takes the first free slot in the listen-port table and instructs the
    /// network engine to listen. Fails with
    /// [`DispatchError::ListenTableFull`] when no slot is free.
    fn listen_port(&mut self, port: u16) -> Result<(), DispatchError>;

    /// Opens an outbound connection owned by the current process
    ///
    /// Asks the engine to connect, broadcasts the poll signal so the
    /// attempt is flushed without waiting for the next scheduler tick, and
    /// tags the connection with the current process and the given state.
    fn connect(
        &mut self,
        endpoint: &Endpoint,
        state: Option<ConnectionState>,
    ) -> Result<ConnectionId, DispatchError>;

    /// Tags a connection with the current process and a user state
    ///
    /// For connections that bypassed the listen/accept path. Every event on
    /// the connection is thereafter routed to the tagging process.
    fn markconn(
        &mut self,
        conn: ConnectionId,
        state: Option<ConnectionState>,
    ) -> Result<(), DispatchError>;
}
