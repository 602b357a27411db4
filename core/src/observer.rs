//! Interpreter observations
//!
//! The interpreter reports what it does through an [`Observer`]. Ordering
//! relative to effects is preserved: `Fork` is observed before the handle is
//! returned and `Await` before the interpreter blocks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, trace};

use crate::fiber::FiberId;
use crate::fork_join::Location;

/// Something the interpreter did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "t")]
pub enum Event {
    Fork { fiber: FiberId, location: Location },
    Await { fiber: FiberId },
    /// A `Return` node was evaluated; `outermost` when it ends the program
    Finished { outermost: bool },
}

/// Sink for interpreter observations
pub trait Observer: Send + Sync {
    fn observe(&self, event: &Event);
}

/// Writes observations as tracing events (the default)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: &Event) {
        match event {
            Event::Fork { fiber, location } => info!(%fiber, %location, "Fork"),
            Event::Await { fiber } => info!(%fiber, "Await"),
            Event::Finished { outermost: true } => info!("Program is over"),
            Event::Finished { outermost: false } => trace!("Return"),
        }
    }
}

/// One recorded observation
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

/// Keeps every observation in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    records: Mutex<Vec<Record>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.records().into_iter().map(|record| record.event).collect()
    }
}

impl Observer for RecordingObserver {
    fn observe(&self, event: &Event) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Record {
                at: Utc::now(),
                event: event.clone(),
            });
    }
}

/// Fan out to several observers in order
impl Observer for Vec<Arc<dyn Observer>> {
    fn observe(&self, event: &Event) {
        for observer in self {
            observer.observe(event);
        }
    }
}
