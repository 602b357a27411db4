//! Tests for the interpreter
//!
//! Organized by feature area

mod fork_tests;
mod helpers;
mod stack_tests;
