//! # Dispatcher
//!
//! The Kestrel event kernel: processes, signals and network-event routing.
//!
//! ## Purpose
//!
//! The dispatcher is the initiator of all program execution. After boot
//! code constructs it and starts the initial processes, [`Dispatcher::run`]
//! is called and never returns. Each cycle it does two things:
//!
//! - Pops the first signal off the signal queue and delivers it to every
//!   listening process.
//! - Runs the idle handler of every process that registered one.
//!
//! Only one signal is processed at a time; the idle handlers of all
//! processes run between any two signal deliveries.
//!
//! ## Philosophy
//!
//! - **Cooperative, single-threaded, deterministic**: nothing preempts a
//!   running handler, so no locking exists anywhere. Tests drive the loop
//!   one [`step`](Dispatcher::step) at a time and observe every decision
//!   through the audit trail.
//! - **Fixed capacities**: the signal queue, the signal number space and
//!   the listen-port table are sized once at construction and exhaustion is
//!   reported to the caller, never absorbed.
//! - **Ownership-free registry**: process state is caller-provided and
//!   reference-counted; the registry holds handles, ids stay valid across
//!   re-entrant registry mutation.
//!
//! A process is defined by up to three handler capabilities: a signal
//! handler, a network-event handler and an idle handler. Handlers receive
//! the dispatcher as `&mut dyn Dispatch` and may re-enter it freely; the
//! delivery engine iterates a snapshot of the registry, so a process
//! exiting mid-delivery is observed safely.

pub mod audit;
pub mod catalog;
pub mod router;
pub mod signal_queue;
pub mod test_utils;

use core_types::{
    ConnectionId, ProcessId, SignalData, SignalId, SignalTarget, SubscriptionSet,
};
use kernel_api::{
    ConnectionEvent, ConnectionEventKind, ConnectionState, Dispatch, DispatchError,
    DispatcherConfig, Endpoint, NetworkEngine, ProcessDescriptor, ProcessHooks, ProcessInfo,
    ProcessState,
};
use router::ConnectionRouter;
use signal_queue::{QueuedSignal, SignalQueue};

pub use audit::{DispatchAuditEvent, DispatchAuditLog, DispatchEvent};
pub use catalog::ToolkitSignals;

/// One registered process
///
/// The registry owns only bookkeeping; the process state is a shared
/// handle to caller-provided storage.
struct ProcessSlot {
    id: ProcessId,
    name: String,
    subscriptions: SubscriptionSet,
    hooks: ProcessHooks,
    state: ProcessState,
}

/// The event kernel
///
/// Owns the process registry, the signal allocator, the bounded signal
/// queue and the connection router, and drives all process execution.
pub struct Dispatcher {
    config: DispatcherConfig,
    /// Registry order is delivery order; new processes go in front.
    procs: Vec<ProcessSlot>,
    current: Option<ProcessId>,
    next_id: u16,
    next_signal: u16,
    quit: SignalId,
    poll: SignalId,
    queue: SignalQueue,
    router: ConnectionRouter,
    engine: Option<Box<dyn NetworkEngine>>,
    audit: DispatchAuditLog,
    ticks: u64,
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Creates a dispatcher with a custom configuration
    ///
    /// Allocates the two kernel signals (quit, poll) up front; the
    /// configured signal space must have room for them.
    pub fn with_config(config: DispatcherConfig) -> Self {
        assert!(
            config.max_signals >= 2,
            "signal space too small for the kernel's quit and poll signals"
        );
        let mut dispatcher = Self {
            queue: SignalQueue::with_capacity(config.signal_queue_capacity),
            router: ConnectionRouter::new(config.listen_port_slots),
            config,
            procs: Vec::new(),
            current: None,
            next_id: 1,
            next_signal: 1,
            quit: SignalId::NONE,
            poll: SignalId::NONE,
            engine: None,
            audit: DispatchAuditLog::new(),
            ticks: 0,
        };
        dispatcher.quit = dispatcher.alloc_signal();
        dispatcher.poll = dispatcher.alloc_signal();
        dispatcher
    }

    /// Attaches the network engine collaborator
    pub fn with_network_engine(mut self, engine: Box<dyn NetworkEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Returns a reference to the audit log
    ///
    /// Used in tests to verify delivery and routing decisions.
    pub fn audit(&self) -> &DispatchAuditLog {
        &self.audit
    }

    /// Returns the number of registered processes
    pub fn process_count(&self) -> usize {
        self.procs.len()
    }

    /// Returns the number of signals waiting in the queue
    pub fn pending_signal_count(&self) -> usize {
        self.queue.len()
    }

    /// Returns the number of completed scheduler cycles
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one scheduler cycle: at most one queued delivery, then a full
    /// idle sweep
    ///
    /// The strict interleaving bounds how long a process waits for its
    /// idle handler to run again: one signal delivery.
    pub fn step(&mut self) {
        self.ticks += 1;
        self.process_one_signal();
        self.run_idle_handlers();
    }

    /// Runs the system forever
    ///
    /// Call after all initialization; never returns.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Pops the oldest queued signal, if any, and delivers it
    pub fn process_one_signal(&mut self) {
        if let Some(entry) = self.queue.pop() {
            self.deliver(entry.signal, &entry.data, entry.target);
        }
    }

    /// Runs every registered process's idle handler once, in registry order
    pub fn run_idle_handlers(&mut self) {
        let snapshot: Vec<ProcessId> = self.procs.iter().map(|slot| slot.id).collect();
        for id in snapshot {
            let Some(slot) = self.procs.iter().find(|slot| slot.id == id) else {
                continue;
            };
            let Some(handler) = slot.hooks.idle else {
                continue;
            };
            let state = slot.state.clone();
            self.current = Some(id);
            handler(self, &state);
        }
    }

    /// Routes one connection event from the network engine
    ///
    /// Called by the engine synchronously, outside the signal queue, once
    /// per event on the single active connection. A newly established
    /// connection on a listened-to port is first tagged with the listening
    /// process and its user state cleared. The event then goes to the tag's
    /// owner if it is still registered with a connection handler installed;
    /// otherwise the engine is instructed to abort the connection, so
    /// events never reach a stale or reused process id.
    pub fn network_event(&mut self, conn: ConnectionId, kind: ConnectionEventKind) {
        if let ConnectionEventKind::Connected { local_port } = kind {
            if let Some(owner) = self.router.owner_of_port(local_port) {
                self.router.tag(conn, owner, None);
                self.audit
                    .record(self.ticks, DispatchEvent::ConnectionTagged { conn, owner });
            }
        }

        let delivery = self.router.tag_owner(conn).and_then(|owner| {
            let slot = self.procs.iter().find(|slot| slot.id == owner)?;
            let handler = slot.hooks.connection?;
            Some((owner, handler, slot.state.clone()))
        });

        match delivery {
            Some((owner, handler, state)) => {
                let event = ConnectionEvent {
                    conn,
                    kind,
                    state: self.router.conn_state(conn),
                };
                self.current = Some(owner);
                self.audit
                    .record(self.ticks, DispatchEvent::ConnectionDelivered { conn, to: owner });
                handler(self, &state, &event);
            }
            None => {
                // The owner exited (or the connection was never tagged).
                self.router.remove_tag(conn);
                if let Some(engine) = self.engine.as_mut() {
                    engine.abort(conn);
                }
                self.audit
                    .record(self.ticks, DispatchEvent::ConnectionAborted { conn });
            }
        }
    }

    /// Delivers a signal to every subscribed, target-matching process
    ///
    /// Iterates the registry as it existed when delivery began: processes
    /// removed mid-delivery are skipped, processes started mid-delivery
    /// are not visited.
    fn deliver(&mut self, signal: SignalId, data: &SignalData, target: SignalTarget) {
        let snapshot: Vec<ProcessId> = self.procs.iter().map(|slot| slot.id).collect();
        for id in snapshot {
            if !target.matches(id) {
                continue;
            }
            let Some(slot) = self.procs.iter().find(|slot| slot.id == id) else {
                continue;
            };
            if !slot.subscriptions.contains(signal) {
                continue;
            }
            let Some(handler) = slot.hooks.signal else {
                continue;
            };
            let state = slot.state.clone();
            self.current = Some(id);
            self.audit
                .record(self.ticks, DispatchEvent::SignalDelivered { signal, to: id });
            handler(self, &state, signal, data);
        }
    }

    /// Draws the next process id from the wrapping counter
    ///
    /// Skips zero and redraws on collision with a live process; a full
    /// cycle without a free value means the id space is exhausted.
    fn alloc_id(&mut self) -> Result<ProcessId, DispatchError> {
        for _ in 0..=u16::MAX as u32 {
            let raw = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if raw == 0 {
                continue;
            }
            if self.procs.iter().all(|slot| slot.id.as_raw() != raw) {
                return Ok(ProcessId::from_raw(raw));
            }
        }
        Err(DispatchError::NoIdAvailable)
    }

    /// Infallible signal allocation for the constructor, after the
    /// capacity assert.
    fn alloc_signal(&mut self) -> SignalId {
        let signal = SignalId::from_raw(self.next_signal);
        self.next_signal += 1;
        self.audit
            .record(self.ticks, DispatchEvent::SignalAllocated { signal });
        signal
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for Dispatcher {
    fn start(
        &mut self,
        descriptor: ProcessDescriptor,
        hooks: ProcessHooks,
        state: ProcessState,
    ) -> Result<ProcessId, DispatchError> {
        let id = self.alloc_id()?;
        let mut subscriptions = SubscriptionSet::new(self.config.max_signals);
        // Every process listens to the quit signal from birth.
        subscriptions.subscribe(self.quit);
        self.procs.insert(
            0,
            ProcessSlot {
                id,
                name: descriptor.name.clone(),
                subscriptions,
                hooks,
                state,
            },
        );
        self.current = Some(id);
        self.audit.record(
            self.ticks,
            DispatchEvent::ProcessStarted {
                id,
                name: descriptor.name,
            },
        );
        Ok(id)
    }

    fn exit(&mut self) -> Result<(), DispatchError> {
        let id = self.current.ok_or(DispatchError::NoCurrentProcess)?;
        let index = self
            .procs
            .iter()
            .position(|slot| slot.id == id)
            .ok_or(DispatchError::NoCurrentProcess)?;

        for port in self.router.release_owned(id) {
            if let Some(engine) = self.engine.as_mut() {
                engine.unlisten(port);
            }
            self.audit
                .record(self.ticks, DispatchEvent::ListenPortReleased { port, owner: id });
        }

        self.procs.remove(index);
        self.current = None;
        self.audit
            .record(self.ticks, DispatchEvent::ProcessExited { id });
        Ok(())
    }

    fn current(&self) -> Option<ProcessId> {
        self.current
    }

    fn process(&self, id: ProcessId) -> Option<ProcessInfo> {
        self.procs.iter().find(|slot| slot.id == id).map(|slot| ProcessInfo {
            id: slot.id,
            name: slot.name.clone(),
            has_signal_handler: slot.hooks.signal.is_some(),
            has_connection_handler: slot.hooks.connection.is_some(),
            has_idle_handler: slot.hooks.idle.is_some(),
        })
    }

    fn quit_signal(&self) -> SignalId {
        self.quit
    }

    fn poll_signal(&self) -> SignalId {
        self.poll
    }

    fn sigalloc(&mut self) -> Result<SignalId, DispatchError> {
        if self.next_signal as usize > self.config.max_signals {
            return Err(DispatchError::SignalLimitReached);
        }
        Ok(self.alloc_signal())
    }

    fn listen(&mut self, signal: SignalId) {
        let Some(id) = self.current else {
            return;
        };
        let Some(slot) = self.procs.iter_mut().find(|slot| slot.id == id) else {
            return;
        };
        slot.subscriptions.subscribe(signal);
        self.audit
            .record(self.ticks, DispatchEvent::Subscribed { id, signal });
    }

    fn emit(
        &mut self,
        signal: SignalId,
        data: SignalData,
        target: SignalTarget,
    ) -> Result<(), DispatchError> {
        if signal.is_none() {
            return Ok(());
        }
        self.queue
            .push(QueuedSignal { signal, data, target })
            .map_err(|_| DispatchError::QueueFull)?;
        self.audit
            .record(self.ticks, DispatchEvent::SignalQueued { signal, target });
        Ok(())
    }

    fn fastemit(&mut self, signal: SignalId, data: SignalData, target: SignalTarget) {
        if signal.is_none() {
            return;
        }
        // Delivery runs arbitrary process code; the caller's context must
        // survive nested synchronous delivery.
        let saved = self.current;
        self.deliver(signal, &data, target);
        self.current = saved;
    }

    fn listen_port(&mut self, port: u16) -> Result<(), DispatchError> {
        let owner = self.current.ok_or(DispatchError::NoCurrentProcess)?;
        self.router.reserve(port, owner)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.listen(port);
        }
        self.audit
            .record(self.ticks, DispatchEvent::ListenPortOpened { port, owner });
        Ok(())
    }

    fn connect(
        &mut self,
        endpoint: &Endpoint,
        state: Option<ConnectionState>,
    ) -> Result<ConnectionId, DispatchError> {
        let engine = self.engine.as_mut().ok_or(DispatchError::ConnectFailed)?;
        let conn = engine.connect(endpoint).ok_or(DispatchError::ConnectFailed)?;

        // Prod the engine's driver so the attempt goes out now instead of
        // waiting for its next periodic poll; a full queue only delays it.
        let poll = self.poll;
        self.emit(poll, core_types::signal_data(conn), SignalTarget::Broadcast)
            .ok();

        self.markconn(conn, state)?;
        Ok(conn)
    }

    fn markconn(
        &mut self,
        conn: ConnectionId,
        state: Option<ConnectionState>,
    ) -> Result<(), DispatchError> {
        let owner = self.current.ok_or(DispatchError::NoCurrentProcess)?;
        self.router.tag(conn, owner, state);
        self.audit
            .record(self.ticks, DispatchEvent::ConnectionTagged { conn, owner });
        Ok(())
    }
}
