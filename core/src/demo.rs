//! Example programs
//!
//! Used by the CLI and by tests.

use std::thread;
use std::time::Duration;

use crate::fiber::Fiber;
use crate::fork_join::{fork_at, ForkJoinProgram, Location};
use crate::program::Program;

/// Inputs for [`sum_program`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumPlan {
    pub left: i64,
    pub right: i64,
    pub left_delay: Duration,
    pub right_delay: Duration,
}

impl Default for SumPlan {
    fn default() -> Self {
        Self {
            left: 2,
            right: 4,
            left_delay: Duration::ZERO,
            right_delay: Duration::ZERO,
        }
    }
}

/// Fork two delayed computations, await both and add the results
///
/// The left action runs `Here`, the right one `Remote`. Either may finish
/// first; the sum does not depend on it.
pub fn sum_program(plan: SumPlan) -> ForkJoinProgram<i64> {
    let SumPlan {
        left,
        right,
        left_delay,
        right_delay,
    } = plan;

    fork_at(Location::Here, move || delayed(left, left_delay)).and_then(
        move |left_fiber: Fiber<i64>| {
            fork_at(Location::Remote, move || delayed(right, right_delay)).and_then(
                move |right_fiber: Fiber<i64>| {
                    left_fiber
                        .join()
                        .and_then(move |a| right_fiber.join().map(move |b| a + b))
                },
            )
        },
    )
}

/// A program of `steps` sequential steps that yields `steps`
///
/// Each step's continuation builds the next step, so the tree never exists
/// in full; only the interpreter's loop carries the chain.
pub fn countdown(steps: u64) -> ForkJoinProgram<u64> {
    count_from(0, steps)
}

fn count_from(done: u64, steps: u64) -> ForkJoinProgram<u64> {
    Program::from_value(done).and_then(move |done| {
        if done >= steps {
            Program::from_value(done)
        } else {
            count_from(done + 1, steps)
        }
    })
}

fn delayed(value: i64, delay: Duration) -> i64 {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    value
}
