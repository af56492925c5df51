//! # Core Types
//!
//! This crate defines the fundamental types used throughout Kestrel.
//!
//! ## Philosophy
//!
//! Core types are designed with these principles:
//! - **Explicit over implicit**: Absence of a process is `Option`, not a
//!   magic sentinel value.
//! - **Type safety first**: Process ids, signal ids and connection ids
//!   cannot be confused with each other.
//!
//! ## Key Types
//!
//! - [`ProcessId`]: Unique identifier for a running process
//! - [`SignalId`]: Kernel-routed event identifier
//! - [`ConnectionId`]: Identifier for a live network connection
//! - [`SignalTarget`]: Delivery target of an emitted signal
//! - [`SubscriptionSet`]: Fixed-width set of signals a process listens for

pub mod ids;
pub mod signal;

pub use ids::{ConnectionId, ProcessId};
pub use signal::{no_data, signal_data, SignalData, SignalId, SignalTarget, SubscriptionSet};
