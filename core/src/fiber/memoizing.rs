//! Memoizing fiber backend
//!
//! The action is handed to a spawner at construction and runs exactly once,
//! whether or not anyone ever reads the result. Readers block on a condvar
//! until the outcome slot is filled. A job the spawner drops without running
//! fills the slot too, so readers fail instead of waiting forever.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use tracing::{debug, warn};

use super::{Action, FiberBackend, FiberId};
use crate::program::Value;
use crate::spawner::Spawner;

/// Fiber that computes once and shares the result with every reader
pub struct MemoizingFiber {
    id: FiberId,
    slot: Arc<Slot>,
}

impl MemoizingFiber {
    /// Start `action` on `spawner` immediately
    pub fn start(id: FiberId, action: Action, spawner: &dyn Spawner) -> Self {
        let slot = Arc::new(Slot::default());
        let unstarted = Unstarted {
            id,
            slot: Arc::clone(&slot),
        };

        debug!(fiber = %id, "Starting fiber");
        spawner.spawn(Box::new(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| action())) {
                Ok(value) => Outcome::Value(value),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(fiber = %id, %message, "Fiber action panicked");
                    Outcome::Panicked(message)
                }
            };
            unstarted.slot.fill(outcome);
        }));

        Self { id, slot }
    }

    /// Whether the action has finished (successfully or not)
    pub fn is_finished(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl FiberBackend for MemoizingFiber {
    fn id(&self) -> FiberId {
        self.id
    }

    fn get_result(&self) -> Value {
        match self.slot.wait() {
            Outcome::Value(value) => value,
            Outcome::Panicked(message) => panic!("fiber {} panicked: {}", self.id, message),
            Outcome::Dropped => panic!("fiber {} was dropped by its spawner before it ran", self.id),
        }
    }
}

/* ===================== Outcome Slot ===================== */

#[derive(Clone)]
enum Outcome {
    Value(Value),
    Panicked(String),
    Dropped,
}

/// Travels with the job; reports the fiber as dropped if the job never ran
struct Unstarted {
    id: FiberId,
    slot: Arc<Slot>,
}

impl Drop for Unstarted {
    fn drop(&mut self) {
        if self.slot.fill_if_empty(Outcome::Dropped) {
            warn!(fiber = %self.id, "Spawner dropped fiber before it ran");
        }
    }
}

#[derive(Default)]
struct Slot {
    outcome: Mutex<Option<Outcome>>,
    ready: Condvar,
}

impl Slot {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Outcome>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fill(&self, outcome: Outcome) {
        *self.lock() = Some(outcome);
        self.ready.notify_all();
    }

    /// Fill unless already filled; returns whether this call filled it
    fn fill_if_empty(&self, outcome: Outcome) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        drop(slot);
        self.ready.notify_all();
        true
    }

    /// Block until filled; no timeout
    fn wait(&self) -> Outcome {
        let guard = self
            .ready
            .wait_while(self.lock(), |outcome| outcome.is_none())
            .unwrap_or_else(PoisonError::into_inner);

        match guard.as_ref() {
            Some(outcome) => outcome.clone(),
            None => unreachable!("condvar released an empty fiber slot"),
        }
    }
}

/// Extract a readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
