//! Process descriptors, state and handler capabilities

use crate::dispatch::Dispatch;
use crate::net::ConnectionEvent;
use core_types::{ProcessId, SignalData, SignalId};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Descriptor for starting a new process
///
/// Process creation is explicit construction: the caller supplies the
/// descriptor, the handler capabilities and the process-local state, and
/// the dispatcher assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    /// Human-readable name for debugging and audit entries
    pub name: String,
}

impl ProcessDescriptor {
    /// Creates a new process descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Process-local state, provided by the caller at `start`
///
/// The registry stores a handle to the state and passes it to every hook
/// invocation; it never interprets the contents. Handlers downcast to their
/// concrete state type.
pub type ProcessState = Rc<RefCell<dyn Any>>;

/// Wraps a value as process-local state.
pub fn process_state<T: 'static>(value: T) -> ProcessState {
    Rc::new(RefCell::new(value))
}

/// Signal handler capability
///
/// Invoked once per matching delivery with the signal id and the shared
/// payload. The handler receives the dispatcher by trait object and may
/// re-enter it (emit, listen, exit, start).
pub type SignalHandler = fn(&mut dyn Dispatch, &ProcessState, SignalId, &SignalData);

/// Network-event handler capability
///
/// Invoked by the connection router for events on connections the process
/// owns.
pub type ConnectionHandler = fn(&mut dyn Dispatch, &ProcessState, &ConnectionEvent);

/// Idle handler capability
///
/// Invoked once per scheduler cycle for every registered process, whether
/// or not a signal was delivered that cycle. Must return promptly; nothing
/// preempts it.
pub type IdleHandler = fn(&mut dyn Dispatch, &ProcessState);

/// The up-to-three handler capabilities of a process
///
/// A process with no signal handler is skipped during signal delivery even
/// if subscribed; a process with no idle handler is skipped by the idle
/// sweep; a process with no connection handler never receives network
/// events.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessHooks {
    pub signal: Option<SignalHandler>,
    pub connection: Option<ConnectionHandler>,
    pub idle: Option<IdleHandler>,
}

impl ProcessHooks {
    /// A process with no capabilities installed
    pub fn none() -> Self {
        Self::default()
    }

    /// Installs a signal handler
    pub fn with_signal(mut self, handler: SignalHandler) -> Self {
        self.signal = Some(handler);
        self
    }

    /// Installs a network-event handler
    pub fn with_connection(mut self, handler: ConnectionHandler) -> Self {
        self.connection = Some(handler);
        self
    }

    /// Installs an idle handler
    pub fn with_idle(mut self, handler: IdleHandler) -> Self {
        self.idle = Some(handler);
        self
    }
}

/// Metadata view of a registered process, returned by lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub id: ProcessId,
    pub name: String,
    pub has_signal_handler: bool,
    pub has_connection_handler: bool,
    pub has_idle_handler: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_signal(_: &mut dyn Dispatch, _: &ProcessState, _: SignalId, _: &SignalData) {}
    fn noop_idle(_: &mut dyn Dispatch, _: &ProcessState) {}

    #[test]
    fn test_descriptor_name() {
        let descriptor = ProcessDescriptor::new("shell");
        assert_eq!(descriptor.name, "shell");
    }

    #[test]
    fn test_hooks_builder() {
        let hooks = ProcessHooks::none().with_signal(noop_signal).with_idle(noop_idle);
        assert!(hooks.signal.is_some());
        assert!(hooks.idle.is_some());
        assert!(hooks.connection.is_none());
    }

    #[test]
    fn test_process_state_downcast() {
        let state = process_state(5u32);
        let mut guard = state.borrow_mut();
        let value = guard.downcast_mut::<u32>().expect("state type");
        *value += 1;
        assert_eq!(*value, 6);
    }
}
