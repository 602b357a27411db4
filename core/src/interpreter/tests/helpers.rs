//! Test helpers for interpreter tests
//!
//! Common utilities for building interpreters and reading observations

use crate::interpreter::ForkJoinInterpreter;
use crate::observer::{Event, RecordingObserver};
use crate::spawner::{InlineSpawner, Spawner, ThreadSpawner};
use std::sync::Arc;

/// Interpreter on `spawner` that records every observation
pub fn recording_interpreter(
    spawner: Arc<dyn Spawner>,
) -> (ForkJoinInterpreter, Arc<RecordingObserver>) {
    let recorder = Arc::new(RecordingObserver::new());
    let interpreter = ForkJoinInterpreter::new(spawner).with_observer(recorder.clone());
    (interpreter, recorder)
}

/// Deterministic interpreter: forked actions finish before fork returns
pub fn inline_interpreter() -> (ForkJoinInterpreter, Arc<RecordingObserver>) {
    recording_interpreter(Arc::new(InlineSpawner))
}

/// Interpreter that forks onto OS threads
pub fn threaded_interpreter() -> (ForkJoinInterpreter, Arc<RecordingObserver>) {
    recording_interpreter(Arc::new(ThreadSpawner))
}

/// Event names, in order
pub fn kinds(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            Event::Fork { .. } => "fork",
            Event::Await { .. } => "await",
            Event::Finished { .. } => "finished",
        })
        .collect()
}

/// Event names of effects only (fork and await)
pub fn effect_kinds(events: &[Event]) -> Vec<&'static str> {
    kinds(events)
        .into_iter()
        .filter(|kind| *kind != "finished")
        .collect()
}
