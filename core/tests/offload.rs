//! Offload protocol: single in-flight discipline, failure propagation,
//! cancellation, stale responses, executor lifetime.

use life_core::{
    cell::Cell,
    error::LifeError,
    grid::{Grid, WireGrid},
    next_generation,
    offload::{ComputeFn, ExecutorStatus, OffloadClient},
};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

fn vertical_blinker() -> Grid {
    let mut g = Grid::new(5, 5).unwrap();
    for y in 1..=3 {
        g.set_cell_at(2, y, Cell::Alive);
    }
    g
}

fn horizontal_blinker() -> Grid {
    let mut g = Grid::new(5, 5).unwrap();
    for x in 1..=3 {
        g.set_cell_at(x, 2, Cell::Alive);
    }
    g
}

/// An executor that computes only when the test sends a token.
fn gated_client() -> (OffloadClient, Sender<()>) {
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let compute: ComputeFn = Box::new(move |g: &Grid| {
        let _ = gate_rx.recv();
        next_generation::calculate(g)
    });
    (OffloadClient::spawn_with(compute).expect("executor"), gate_tx)
}

#[test]
fn calculates_next_generation_off_thread() {
    let _ = env_logger::builder().is_test(true).try_init();
    let client = OffloadClient::spawn().expect("executor");
    assert!(client.is_available());

    let outcome = client.calculate(&vertical_blinker(), 6).unwrap().wait().unwrap();
    assert_eq!(outcome.grid, horizontal_blinker());
    assert_eq!(outcome.generation, 7);
    assert_eq!(outcome.performance.living_cells, 3);
    assert!(!client.is_calculating());

    let perf = client.last_performance().expect("performance reported before result");
    assert_eq!(perf.request_id, outcome.request_id);
    assert_eq!(perf.cells_processed, 3);
    assert!(perf.total_time >= 0.0);
}

#[test]
fn sequential_requests_each_resolve() {
    let client = OffloadClient::spawn().expect("executor");
    let mut grid = vertical_blinker();
    for generation in 0..6 {
        let outcome = client.calculate(&grid, generation).unwrap().wait().unwrap();
        assert_eq!(outcome.generation, generation + 1);
        grid = outcome.grid;
    }
    assert_eq!(grid, vertical_blinker(), "even number of blinker steps");
}

#[test]
fn second_request_while_pending_is_rejected() {
    let (client, gate) = gated_client();
    let first = client.calculate(&vertical_blinker(), 0).unwrap();
    assert!(client.is_calculating());

    let second = client.calculate(&vertical_blinker(), 0);
    assert!(matches!(second, Err(LifeError::CalculationInProgress)));

    gate.send(()).unwrap();
    let outcome = first.wait().expect("first request unaffected by the rejected one");
    assert_eq!(outcome.grid, horizontal_blinker());
    assert!(!client.is_calculating());
}

#[test]
fn cancel_resolves_pending_and_discards_late_result() {
    let (client, gate) = gated_client();
    let cancelled = client.calculate(&vertical_blinker(), 0).unwrap();
    let cancelled_id = cancelled.request_id();

    assert!(client.cancel());
    assert!(matches!(cancelled.wait(), Err(LifeError::CalculationCancelled)));
    assert!(!client.is_calculating());
    assert!(!client.cancel(), "nothing left to cancel");

    // One token for the cancelled request, one for the next.
    let next = client.calculate(&horizontal_blinker(), 10).unwrap();
    let next_id = next.request_id();
    assert_ne!(next_id, cancelled_id);
    gate.send(()).unwrap();
    gate.send(()).unwrap();

    let outcome = next.wait().unwrap();
    assert_eq!(outcome.request_id, next_id);
    assert_eq!(outcome.generation, 11, "late result for the cancelled request must not leak");
    assert_eq!(outcome.grid, vertical_blinker());
}

#[test]
fn wait_timeout_reports_still_pending() {
    let (client, gate) = gated_client();
    let pending = client.calculate(&vertical_blinker(), 0).unwrap();
    assert!(pending.wait_timeout(Duration::from_millis(20)).is_none());
    assert!(pending.try_outcome().is_none());

    gate.send(()).unwrap();
    let reply = pending.wait_timeout(Duration::from_secs(5)).expect("resolved");
    assert!(reply.is_ok());
}

#[test]
fn malformed_request_grid_surfaces_as_runtime_error() {
    let client = OffloadClient::spawn().expect("executor");
    let bad = WireGrid { width: 3, height: 3, living_cells: vec!["9,9".into()] };

    match client.calculate_wire(bad, 0).unwrap().wait() {
        Err(LifeError::ExecutorRuntime { message, .. }) => {
            assert!(message.contains("outside"), "unexpected message: {message}");
        }
        other => panic!("expected ExecutorRuntime, got {other:?}"),
    }
    assert!(client.last_error().is_some());
    assert!(!client.is_calculating());

    // The executor survives and serves the next request.
    assert!(client.calculate(&vertical_blinker(), 0).unwrap().wait().is_ok());
    assert!(client.last_error().is_none(), "a new request clears the last error");
}

#[test]
fn executor_panic_is_reported_and_survived() {
    let compute: ComputeFn = Box::new(|g: &Grid| {
        if g.is_empty() {
            panic!("nothing to compute");
        }
        next_generation::calculate(g)
    });
    let client = OffloadClient::spawn_with(compute).expect("executor");

    let err = client.calculate(&Grid::new(4, 4).unwrap(), 0).unwrap().wait().unwrap_err();
    match err {
        LifeError::ExecutorRuntime { message, .. } => assert_eq!(message, "nothing to compute"),
        other => panic!("expected ExecutorRuntime, got {other:?}"),
    }
    assert!(client.is_available());
    assert!(client.calculate(&vertical_blinker(), 0).unwrap().wait().is_ok());
}

#[test]
fn unavailable_executor_fails_immediately() {
    let client = OffloadClient::unavailable("threads disabled on this host");
    assert!(!client.is_available());
    match client.calculate(&vertical_blinker(), 0) {
        Err(LifeError::ExecutorUnavailable(reason)) => assert!(reason.contains("threads disabled")),
        Err(other) => panic!("expected ExecutorUnavailable, got {other:?}"),
        Ok(_) => panic!("calculate must not be accepted without an executor"),
    }
    assert!(!client.is_calculating());
}

#[test]
fn terminated_executor_rejects_calculations() {
    let mut client = OffloadClient::spawn().expect("executor");
    client.terminate();
    assert_eq!(client.status(), ExecutorStatus::Terminated);
    assert!(matches!(
        client.calculate(&vertical_blinker(), 0),
        Err(LifeError::ExecutorUnavailable(_))
    ));
    client.terminate();
}

#[test]
fn terminate_abandons_pending_request() {
    let (mut client, gate) = gated_client();
    let pending = client.calculate(&vertical_blinker(), 0).unwrap();

    // Let the executor finish after terminate has resolved the request,
    // so the join inside terminate can complete.
    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        drop(gate);
    });
    client.terminate();
    releaser.join().unwrap();

    assert!(matches!(pending.wait(), Err(LifeError::ExecutorUnavailable(_))));
}
