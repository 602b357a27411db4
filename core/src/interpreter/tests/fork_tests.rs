//! Tests for ForkAt: eager start, non-blocking fork, observation order

use super::helpers::{inline_interpreter, kinds, threaded_interpreter};
use crate::fiber::Fiber;
use crate::fork_join::{fork_at, Location};
use crate::observer::Event;
use crate::program::Program;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_fork_then_join_yields_action_value() {
    let (interpreter, _) = threaded_interpreter();
    let program = fork_at(Location::Here, || 42).and_then(|fiber| fiber.join());

    assert_eq!(interpreter.interpret(&program), 42);
}

#[test]
fn test_fork_does_not_wait_for_action() {
    let (interpreter, _) = threaded_interpreter();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let gate_rx = Mutex::new(gate_rx);

    let program = fork_at(Location::Remote, move || {
        gate_rx.lock().unwrap().recv_timeout(TIMEOUT).is_ok()
    });

    // The action is still parked on the gate when interpretation returns
    let fiber = interpreter.interpret(&program);
    gate_tx.send(()).unwrap();

    assert!(fiber.get_result());
}

#[test]
fn test_unawaited_fork_still_runs() {
    let (interpreter, recorder) = threaded_interpreter();
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);

    let program = fork_at(Location::Here, move || {
        let _ = tx.lock().unwrap().send("ran");
    })
    .map(|_| "done");

    assert_eq!(interpreter.interpret(&program), "done");
    assert_eq!(rx.recv_timeout(TIMEOUT), Ok("ran"));
    assert!(!kinds(&recorder.events()).contains(&"await"));
}

#[test]
fn test_fork_is_observed_before_handle_is_returned() {
    let (interpreter, recorder) = inline_interpreter();
    let seen = recorder.clone();

    let program = fork_at(Location::Remote, || 1).and_then(move |fiber: Fiber<i32>| {
        let observed = seen.events().contains(&Event::Fork {
            fiber: fiber.id(),
            location: Location::Remote,
        });
        Program::from_value(observed)
    });

    assert!(interpreter.interpret(&program));
}

#[test]
fn test_fork_records_location() {
    let (interpreter, recorder) = inline_interpreter();
    let program = fork_at(Location::Here, || 1)
        .zip(fork_at(Location::Remote, || 2))
        .map(|_| ());

    interpreter.interpret(&program);

    let locations: Vec<_> = recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Fork { location, .. } => Some(location),
            _ => None,
        })
        .collect();
    assert_eq!(locations, vec![Location::Here, Location::Remote]);
}

#[test]
fn test_each_fork_gets_its_own_fiber() {
    let (interpreter, _) = inline_interpreter();
    let program = fork_at(Location::Here, || 1).zip(fork_at(Location::Here, || 1));

    let (a, b) = interpreter.interpret(&program);

    assert_ne!(a.id(), b.id());
}

#[test]
fn test_forked_value_is_computed_once_for_many_joins() {
    let (interpreter, recorder) = inline_interpreter();
    let counter = Arc::new(AtomicUsize::new(0));
    let bump = counter.clone();

    let program = fork_at(Location::Here, move || bump.fetch_add(1, Ordering::SeqCst) + 1)
        .and_then(|fiber| fiber.join().zip(fiber.join()));

    assert_eq!(interpreter.interpret(&program), (1, 1));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(
        kinds(&recorder.events()),
        vec!["fork", "await", "await", "finished"]
    );
}

#[test]
fn test_reinterpretation_forks_again() {
    let (interpreter, _) = inline_interpreter();
    let counter = Arc::new(AtomicUsize::new(0));
    let bump = counter.clone();

    let program = fork_at(Location::Here, move || bump.fetch_add(1, Ordering::SeqCst) + 1)
        .and_then(|fiber| fiber.join());

    assert_eq!(interpreter.interpret(&program), 1);
    assert_eq!(interpreter.interpret(&program), 2);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_fiber_outlives_the_program_that_forked_it() {
    let (interpreter, _) = threaded_interpreter();
    let program = fork_at(Location::Remote, || "still here".to_string());

    let fiber = interpreter.interpret(&program);

    // Read outside any program
    assert_eq!(fiber.get_result(), "still here");
}
