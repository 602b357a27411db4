//! # Interpreter - Stack-Driven Program Evaluator
//!
//! Walks a [`Program`](crate::program::Program) tree and performs its
//! instructions.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: pending continuations live in
//!    `Vm::continuations`, not on the call stack, so a program with any
//!    number of sequential steps runs in constant stack depth
//! 2. **Generic driver**: `step()` owns the three-way node case split and is
//!    the same for every instruction set
//! 3. **Pluggable effects**: a [`Handler`] gives one instruction set its
//!    meaning; [`ForkJoinInterpreter`] is the reference handler
//! 4. **No state between runs**: each run builds a fresh `Vm`
//!
//! There is no error channel. A handler that panics (for example an await on
//! a fiber whose action panicked) aborts the run.

pub mod exec_loop;
pub mod fork_join;
pub mod vm;

#[cfg(test)]
mod tests;

pub use exec_loop::{run, run_until_done, step, Handler};
pub use fork_join::ForkJoinInterpreter;
pub use vm::{Step, Vm};
