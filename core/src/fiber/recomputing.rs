//! Recomputing fiber backend

use super::{Action, FiberBackend, FiberId};
use crate::program::Value;

/// Fiber that runs its action on every read
///
/// Nothing is started at construction. Each `get_result()` executes the
/// action on the calling thread, so side effects repeat and a
/// non-deterministic action may return different values.
pub struct RecomputingFiber {
    id: FiberId,
    action: Action,
}

impl RecomputingFiber {
    pub fn new(action: Action) -> Self {
        Self {
            id: FiberId::new(),
            action,
        }
    }
}

impl FiberBackend for RecomputingFiber {
    fn id(&self) -> FiberId {
        self.id
    }

    fn get_result(&self) -> Value {
        (self.action)()
    }
}
