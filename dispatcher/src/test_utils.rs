//! Test utilities for dispatcher and integration tests
//!
//! Recording processes and a scripted network engine, so tests can observe
//! exactly what the kernel delivered and what it instructed the engine to
//! do. Simulation-only; nothing here is production code.

use crate::Dispatcher;
use core_types::{ConnectionId, ProcessId, SignalData, SignalId};
use kernel_api::{
    process_state, ConnectionEvent, Dispatch, Endpoint, NetworkEngine, ProcessDescriptor,
    ProcessHooks, ProcessState,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Process-local state for recording processes
///
/// Accumulates everything the kernel hands the process.
#[derive(Default)]
pub struct Recorder {
    /// Signal deliveries, in order, with their payloads
    pub signals: Vec<(SignalId, SignalData)>,
    /// Number of idle-handler invocations
    pub idle_runs: usize,
    /// Connection events, in order
    pub conn_events: Vec<ConnectionEvent>,
}

/// Signal handler that appends each delivery to the [`Recorder`].
pub fn recording_signal_handler(
    _dispatcher: &mut dyn Dispatch,
    state: &ProcessState,
    signal: SignalId,
    data: &SignalData,
) {
    with_state::<Recorder, _>(state, |recorder| {
        recorder.signals.push((signal, data.clone()));
    });
}

/// Signal handler that records, then exits on the quit signal.
///
/// The well-behaved citizen of the quit protocol: clean up, then call
/// `exit` yourself.
pub fn quitting_signal_handler(
    dispatcher: &mut dyn Dispatch,
    state: &ProcessState,
    signal: SignalId,
    data: &SignalData,
) {
    with_state::<Recorder, _>(state, |recorder| {
        recorder.signals.push((signal, data.clone()));
    });
    if signal == dispatcher.quit_signal() {
        dispatcher.exit().expect("quit handler runs as current process");
    }
}

/// Idle handler that counts invocations in the [`Recorder`].
pub fn recording_idle_handler(_dispatcher: &mut dyn Dispatch, state: &ProcessState) {
    with_state::<Recorder, _>(state, |recorder| {
        recorder.idle_runs += 1;
    });
}

/// Connection handler that appends each event to the [`Recorder`].
pub fn recording_connection_handler(
    _dispatcher: &mut dyn Dispatch,
    state: &ProcessState,
    event: &ConnectionEvent,
) {
    with_state::<Recorder, _>(state, |recorder| {
        recorder.conn_events.push(event.clone());
    });
}

/// Starts a process with all three recording hooks installed.
///
/// Returns the assigned id and the shared [`Recorder`] state.
pub fn start_recording_process(
    dispatcher: &mut dyn Dispatch,
    name: &str,
) -> (ProcessId, ProcessState) {
    let state = process_state(Recorder::default());
    let hooks = ProcessHooks::none()
        .with_signal(recording_signal_handler)
        .with_idle(recording_idle_handler)
        .with_connection(recording_connection_handler);
    let id = dispatcher
        .start(ProcessDescriptor::new(name), hooks, state.clone())
        .expect("process id space is not exhausted in tests");
    (id, state)
}

/// Borrows a process state as its concrete type.
///
/// Panics if the state is of a different type or already borrowed; both
/// indicate a broken test.
pub fn with_state<T: 'static, R>(state: &ProcessState, f: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = state.borrow_mut();
    let value = guard
        .downcast_mut::<T>()
        .expect("process state type mismatch");
    f(value)
}

/// One instruction the kernel gave the network engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCommand {
    Listen(u16),
    Unlisten(u16),
    Connect(Endpoint),
    Abort(ConnectionId),
}

/// Shared, cloneable view of the commands a [`RecordingNetworkEngine`]
/// received
#[derive(Clone, Default)]
pub struct NetCommandLog {
    commands: Rc<RefCell<Vec<NetCommand>>>,
}

impl NetCommandLog {
    /// Returns a copy of all recorded commands, in order.
    pub fn commands(&self) -> Vec<NetCommand> {
        self.commands.borrow().clone()
    }

    /// Returns the ports the engine was told to listen on, in order.
    pub fn listens(&self) -> Vec<u16> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                NetCommand::Listen(port) => Some(*port),
                _ => None,
            })
            .collect()
    }

    /// Returns the ports the engine was told to stop listening on, in order.
    pub fn unlistens(&self) -> Vec<u16> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                NetCommand::Unlisten(port) => Some(*port),
                _ => None,
            })
            .collect()
    }

    /// Returns the endpoints the engine was asked to connect to, in order.
    pub fn connects(&self) -> Vec<Endpoint> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                NetCommand::Connect(endpoint) => Some(endpoint.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the connections the engine was told to abort, in order.
    pub fn aborts(&self) -> Vec<ConnectionId> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                NetCommand::Abort(conn) => Some(*conn),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Checks if no command was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    fn record(&self, command: NetCommand) {
        self.commands.borrow_mut().push(command);
    }
}

/// Scripted network engine for tests
///
/// Records every instruction the kernel issues. Outbound connects mint a
/// fresh connection id unless the engine was built refusing them.
pub struct RecordingNetworkEngine {
    log: NetCommandLog,
    refuse_connects: bool,
}

impl RecordingNetworkEngine {
    /// Creates an engine that accepts outbound connections.
    pub fn new() -> Self {
        Self {
            log: NetCommandLog::default(),
            refuse_connects: false,
        }
    }

    /// Creates an engine that refuses every outbound connection.
    pub fn refusing_connects() -> Self {
        Self {
            log: NetCommandLog::default(),
            refuse_connects: true,
        }
    }

    /// Returns a shared handle to the command log.
    ///
    /// Take it before boxing the engine into the dispatcher.
    pub fn log_handle(&self) -> NetCommandLog {
        self.log.clone()
    }
}

impl Default for RecordingNetworkEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkEngine for RecordingNetworkEngine {
    fn listen(&mut self, port: u16) {
        self.log.record(NetCommand::Listen(port));
    }

    fn unlisten(&mut self, port: u16) {
        self.log.record(NetCommand::Unlisten(port));
    }

    fn connect(&mut self, endpoint: &Endpoint) -> Option<ConnectionId> {
        self.log.record(NetCommand::Connect(endpoint.clone()));
        if self.refuse_connects {
            None
        } else {
            Some(ConnectionId::new())
        }
    }

    fn abort(&mut self, conn: ConnectionId) {
        self.log.record(NetCommand::Abort(conn));
    }
}

/// Builds a dispatcher wired to a recording engine.
///
/// Convenience for the common test bootstrap; returns the dispatcher and
/// the engine's command log.
pub fn dispatcher_with_recording_engine() -> (Dispatcher, NetCommandLog) {
    let engine = RecordingNetworkEngine::new();
    let log = engine.log_handle();
    let dispatcher = Dispatcher::new().with_network_engine(Box::new(engine));
    (dispatcher, log)
}
