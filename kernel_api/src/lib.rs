//! # Kernel API
//!
//! The interface between processes and the Kestrel dispatcher.
//!
//! This crate defines what a process *is* (a descriptor, caller-provided
//! state, and up to three handler capabilities), the [`Dispatch`] trait
//! processes call back into, the [`NetworkEngine`] collaborator boundary,
//! and the error and configuration surface. The dispatcher crate provides
//! the implementation.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod net;
pub mod process;

pub use config::DispatcherConfig;
pub use dispatch::Dispatch;
pub use error::DispatchError;
pub use net::{
    ConnectionEvent, ConnectionEventKind, ConnectionState, Endpoint, NetworkEngine,
};
pub use process::{
    process_state, ConnectionHandler, IdleHandler, ProcessDescriptor, ProcessHooks, ProcessInfo,
    ProcessState, SignalHandler,
};
