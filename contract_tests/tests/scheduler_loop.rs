//! Scheduler Loop Tests
//!
//! Validates the strict interleaving: at most one queued signal per cycle,
//! and a full idle sweep between any two deliveries, whether or not the
//! queue had anything to deliver.

use contract_tests::{run_cycles, test_bootstrap};
use core_types::{no_data, SignalTarget};
use dispatcher::test_utils::{start_recording_process, with_state, Recorder};
use kernel_api::Dispatch;

/// Test: Idle handlers run every cycle even with an empty queue
#[test]
fn test_idle_runs_on_empty_queue() {
    let (mut dispatcher, _log) = test_bootstrap();

    let (_, state_a) = start_recording_process(&mut dispatcher, "poller-a");
    let (_, state_b) = start_recording_process(&mut dispatcher, "poller-b");

    run_cycles(&mut dispatcher, 5);

    with_state::<Recorder, _>(&state_a, |recorder| {
        assert_eq!(recorder.idle_runs, 5);
        assert!(recorder.signals.is_empty());
    });
    with_state::<Recorder, _>(&state_b, |recorder| assert_eq!(recorder.idle_runs, 5));
}

/// Test: Exactly one queued signal is processed per cycle, with an idle
/// sweep in between
#[test]
fn test_one_delivery_per_cycle() {
    let (mut dispatcher, _log) = test_bootstrap();

    let (_, state) = start_recording_process(&mut dispatcher, "listener");
    let signal = dispatcher.sigalloc().expect("signal available");
    dispatcher.listen(signal);

    for _ in 0..3 {
        dispatcher
            .emit(signal, no_data(), SignalTarget::Broadcast)
            .expect("queue has room");
    }

    dispatcher.step();
    assert_eq!(dispatcher.pending_signal_count(), 2);
    with_state::<Recorder, _>(&state, |recorder| {
        assert_eq!(recorder.signals.len(), 1);
        assert_eq!(recorder.idle_runs, 1, "idle sweep after the delivery");
    });

    dispatcher.step();
    assert_eq!(dispatcher.pending_signal_count(), 1);
    with_state::<Recorder, _>(&state, |recorder| {
        assert_eq!(recorder.signals.len(), 2);
        assert_eq!(recorder.idle_runs, 2);
    });
}

/// Test: A process that exits stops receiving idle sweeps; the rest keep
/// running
#[test]
fn test_idle_sweep_skips_exited_process() {
    let (mut dispatcher, _log) = test_bootstrap();

    let (_, transient) = start_recording_process(&mut dispatcher, "transient");
    dispatcher.exit().expect("exit current");

    let (_, survivor) = start_recording_process(&mut dispatcher, "survivor");

    run_cycles(&mut dispatcher, 2);

    with_state::<Recorder, _>(&transient, |recorder| assert_eq!(recorder.idle_runs, 0));
    with_state::<Recorder, _>(&survivor, |recorder| assert_eq!(recorder.idle_runs, 2));
}

/// Test: The tick counter advances once per cycle
#[test]
fn test_tick_counter() {
    let (mut dispatcher, _log) = test_bootstrap();
    assert_eq!(dispatcher.ticks(), 0);
    run_cycles(&mut dispatcher, 4);
    assert_eq!(dispatcher.ticks(), 4);
}
