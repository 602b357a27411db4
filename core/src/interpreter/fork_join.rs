//! Reference interpreter for the fork-join instruction set
//!
//! - `ForkAt`: observe `Fork`, start a memoizing fiber on the spawner, yield
//!   the handle without blocking
//! - `Await`: observe `Await`, then block on the fiber with no timeout

use std::fmt;
use std::sync::Arc;

use super::exec_loop::{run, Handler};
use crate::fiber::{FiberId, MemoizingFiber, RawFiber};
use crate::fork_join::{ForkJoin, ForkJoinProgram};
use crate::observer::{Event, Observer, TracingObserver};
use crate::program::{Data, Value};
use crate::spawner::{Spawner, ThreadSpawner};

/// Interprets fork-join programs against a spawner
#[derive(Clone)]
pub struct ForkJoinInterpreter {
    spawner: Arc<dyn Spawner>,
    observer: Arc<dyn Observer>,
}

impl ForkJoinInterpreter {
    /// Interpreter that forks onto `spawner` and logs through tracing
    pub fn new(spawner: Arc<dyn Spawner>) -> Self {
        Self {
            spawner,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Run `program` to completion and return its value
    ///
    /// Blocks whenever the program awaits a fiber that has not finished.
    /// Forked fibers that are never awaited keep running after this returns.
    pub fn interpret<A: Data>(&self, program: &ForkJoinProgram<A>) -> A {
        run(program, self)
    }
}

impl Default for ForkJoinInterpreter {
    fn default() -> Self {
        Self::new(Arc::new(ThreadSpawner))
    }
}

impl fmt::Debug for ForkJoinInterpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkJoinInterpreter").finish_non_exhaustive()
    }
}

impl Handler<ForkJoin> for ForkJoinInterpreter {
    fn handle(&self, instr: &ForkJoin) -> Value {
        match instr {
            ForkJoin::ForkAt {
                location,
                action,
                seal,
            } => {
                let id = FiberId::new();
                self.observer.observe(&Event::Fork {
                    fiber: id,
                    location: *location,
                });

                let fiber = MemoizingFiber::start(id, Arc::clone(action), self.spawner.as_ref());
                seal(RawFiber::new(fiber))
            }

            ForkJoin::Await { fiber } => {
                self.observer.observe(&Event::Await { fiber: fiber.id() });
                fiber.get_result()
            }
        }
    }

    fn on_return(&self, outermost: bool) {
        self.observer.observe(&Event::Finished { outermost });
    }
}
