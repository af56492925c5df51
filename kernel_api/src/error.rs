//! Dispatcher error types

use thiserror::Error;

/// Errors that can occur when interacting with the dispatcher
///
/// Resource exhaustion is always reported to the immediate caller and never
/// retried or escalated by the kernel; the caller owns the retry or drop
/// decision.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The signal queue is at capacity; the emit was rejected unchanged
    #[error("Signal queue is full")]
    QueueFull,

    /// Every candidate process id collided with a live process
    #[error("No process ID available")]
    NoIdAvailable,

    /// The configured signal number space is exhausted
    #[error("Signal numbers exhausted")]
    SignalLimitReached,

    /// Every slot in the listen-port table is taken
    #[error("Listen port table is full")]
    ListenTableFull,

    /// The operation requires a current process and none is running
    #[error("No process is currently running")]
    NoCurrentProcess,

    /// The network engine is absent or refused the connection
    #[error("Connection could not be opened")]
    ConnectFailed,
}
