//! Tests for constant-stack evaluation of long programs

use super::helpers::inline_interpreter;
use crate::demo::countdown;
use crate::fork_join::{fork_at, ForkJoin, Location};
use crate::interpreter::{step, ForkJoinInterpreter, Step, Vm};
use crate::program::Program;
use crate::spawner::InlineSpawner;
use std::sync::Arc;

/// Inline interpreter that only logs, for programs too long to record
fn quiet_interpreter() -> ForkJoinInterpreter {
    ForkJoinInterpreter::new(Arc::new(InlineSpawner))
}

fn map_chain(length: u32) -> Program<ForkJoin, u32> {
    (0..length).fold(Program::from_value(0), |program, _| program.map(|n| n + 1))
}

#[test]
fn test_million_step_chain() {
    // Deeper than any default thread stack could hold with one frame per step
    let interpreter = ForkJoinInterpreter::default();

    assert_eq!(interpreter.interpret(&countdown(1_000_000)), 1_000_000);
}

#[test]
fn test_zero_step_chain() {
    let (interpreter, _) = inline_interpreter();

    assert_eq!(interpreter.interpret(&countdown(0)), 0);
}

#[test]
fn test_chain_keeps_continuation_stack_flat() {
    let (interpreter, _) = inline_interpreter();
    let program = countdown(1_000);
    let mut vm = Vm::new(&program);
    let mut deepest = 0;

    let done = loop {
        match step(&mut vm, &interpreter) {
            Step::Continue => deepest = deepest.max(vm.depth()),
            Step::Done(value) => break value,
        }
    };

    assert_eq!(done, 1_000);
    assert!(deepest <= 1, "continuation stack grew to {}", deepest);
}

#[test]
fn test_left_nested_chain_uses_heap_stack() {
    let (interpreter, _) = inline_interpreter();
    let program = (0..1_000).fold(Program::<ForkJoin, u32>::from_value(0), |program, _| {
        program.map(|n| n + 1)
    });
    let mut vm = Vm::new(&program);
    let mut deepest = 0;

    let done = loop {
        match step(&mut vm, &interpreter) {
            Step::Continue => deepest = deepest.max(vm.depth()),
            Step::Done(value) => break value,
        }
    };

    assert_eq!(done, 1_000);
    assert_eq!(deepest, 1_000);
}

#[test]
fn test_long_chain_of_forks_and_joins() {
    let (interpreter, recorder) = inline_interpreter();

    fn fork_chain(remaining: u32, total: u64) -> Program<ForkJoin, u64> {
        if remaining == 0 {
            return Program::from_value(total);
        }
        fork_at(Location::Here, move || total + 1)
            .and_then(|fiber| fiber.join())
            .and_then(move |next| fork_chain(remaining - 1, next))
    }

    assert_eq!(interpreter.interpret(&fork_chain(10_000, 0)), 10_000);
    assert_eq!(recorder.events().len(), 20_001);
}

#[test]
fn test_million_map_chain_interprets_and_drops() {
    let program = map_chain(1_000_000);

    assert_eq!(quiet_interpreter().interpret(&program), 1_000_000);
    drop(program);
}

#[test]
fn test_million_map_chain_drops_without_running() {
    drop(map_chain(1_000_000));
}

#[test]
fn test_dropping_one_handle_keeps_shared_prefix() {
    let prefix = map_chain(100_000);
    let longer = prefix.clone().map(|n| n * 2);

    drop(prefix);

    assert_eq!(quiet_interpreter().interpret(&longer), 200_000);
}

#[test]
fn test_sequence_of_many_forks() {
    let forks = (0..100_000_u64)
        .map(|n| fork_at(Location::Here, move || n))
        .collect();
    let program = Program::sequence(forks)
        .map(|fibers| (fibers.len(), fibers.last().map(|fiber| fiber.get_result())));

    assert_eq!(
        quiet_interpreter().interpret(&program),
        (100_000, Some(99_999))
    );
    drop(program);
}
