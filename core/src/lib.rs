//! forkjoin - fork/join programs as data
//!
//! Programs are built with the combinators in [`program`] and the fork-join
//! constructors in [`fork_join`], then handed to an interpreter:
//!
//! ```
//! use forkjoin_core::{fork_at, ForkJoinInterpreter, Location};
//!
//! let program = fork_at(Location::Here, || 40)
//!     .and_then(|fiber| fiber.join())
//!     .map(|n| n + 2);
//!
//! assert_eq!(ForkJoinInterpreter::default().interpret(&program), 42);
//! ```
//!
//! Known gaps, kept on purpose: no cancellation, no timeouts, no retries and
//! no typed failure channel. An action that panics makes every await on its
//! fiber panic.

pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod fiber;
pub mod fork_join;
pub mod interpreter;
pub mod observer;
pub mod program;
pub mod spawner;

// Re-export the construction and interpretation API
pub use error::Error;
pub use fiber::{Fiber, FiberId};
pub use fork_join::{await_fiber, fork_at, ForkJoin, ForkJoinProgram, Location};
pub use interpreter::{ForkJoinInterpreter, Handler};
pub use observer::{Event, Observer, RecordingObserver, TracingObserver};
pub use program::{Data, Instruction, InstructionSet, Program, Value};
pub use spawner::{InlineSpawner, Spawner, SpawnerKind, ThreadSpawner, TokioSpawner};
