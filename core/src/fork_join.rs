//! Fork-join instruction set
//!
//! Two primitive effects:
//! - `ForkAt`: start an action independently and yield a [`Fiber`] for it
//! - `Await`: block on a fiber and yield its value
//!
//! Programs over this set are built with [`fork_at`] and [`Fiber::join`]
//! (or [`await_fiber`]) and sequenced with the [`Program`] combinators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::fiber::{Action, Fiber, RawFiber};
use crate::program::{erase, Data, Instruction, InstructionSet, Program, Value};

/// Where a fork should run
///
/// A placeholder tag: it carries no routing information and does not
/// affect execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Here,
    Remote,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Here => f.write_str("here"),
            Location::Remote => f.write_str("remote"),
        }
    }
}

/// Fork-join instructions
pub enum ForkJoin {
    /// Start `action`; yields the `Fiber<A>` that `seal` builds from the
    /// handler's untyped fiber
    ForkAt {
        location: Location,
        action: Action,
        seal: fn(RawFiber) -> Value,
    },
    /// Block on `fiber`; yields its value
    Await { fiber: RawFiber },
}

impl fmt::Debug for ForkJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForkJoin::ForkAt { location, .. } => f
                .debug_struct("ForkAt")
                .field("location", location)
                .finish_non_exhaustive(),
            ForkJoin::Await { fiber } => f.debug_struct("Await").field("fiber", fiber).finish(),
        }
    }
}

impl InstructionSet for ForkJoin {}

/// Program over the fork-join instruction set
pub type ForkJoinProgram<A> = Program<ForkJoin, A>;

/// Fork `action` at `location`, yielding a handle to it
///
/// The action may block, sleep or panic; nothing is asked of it.
pub fn fork_at<A, F>(location: Location, action: F) -> ForkJoinProgram<Fiber<A>>
where
    A: Data,
    F: Fn() -> A + Send + Sync + 'static,
{
    let action: Action = Arc::new(move || erase(action()));
    Program::from_instruction(Instruction::new(ForkJoin::ForkAt {
        location,
        action,
        seal: seal::<A>,
    }))
}

/// Block on `fiber`, yielding its value
pub fn await_fiber<A: Data>(fiber: &Fiber<A>) -> ForkJoinProgram<A> {
    Program::from_instruction(Instruction::new(ForkJoin::Await {
        fiber: fiber.raw().clone(),
    }))
}

fn seal<A: Data>(raw: RawFiber) -> Value {
    erase(Fiber::<A>::from_raw(raw))
}

impl<A: Data> Fiber<A> {
    /// Program that awaits this fiber
    pub fn join(&self) -> ForkJoinProgram<A> {
        await_fiber(self)
    }
}
