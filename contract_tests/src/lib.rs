//! # Contract Tests
//!
//! End-to-end tests of the dispatcher's observable contract: process
//! lifecycle, signal delivery, scheduler interleaving and connection
//! routing. Shared bootstrap helpers live here; the scenarios are in
//! `tests/`.

use dispatcher::test_utils::{dispatcher_with_recording_engine, NetCommandLog};
use dispatcher::Dispatcher;

/// Builds a dispatcher wired to a recording network engine.
pub fn test_bootstrap() -> (Dispatcher, NetCommandLog) {
    dispatcher_with_recording_engine()
}

/// Runs the scheduler loop for a fixed number of cycles.
pub fn run_cycles(dispatcher: &mut Dispatcher, cycles: usize) {
    for _ in 0..cycles {
        dispatcher.step();
    }
}
