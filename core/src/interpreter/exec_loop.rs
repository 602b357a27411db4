//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! Each step evaluates one node:
//!
//! - `AndThen(first, k)`: push `k`, continue with `first`
//! - `Return(value)`: the value is ready
//! - `Instruction(op)`: the handler performs `op` and yields a value
//!
//! A ready value is fed to the innermost pending continuation, whose program
//! becomes the next node. With no continuation left the program is done.

use tracing::trace;

use super::vm::{Step, Vm};
use crate::program::{unerase, Data, InstructionSet, Node, Program, Value};

/// Gives an instruction set its runtime meaning
///
/// The driver never looks inside instructions; everything family-specific
/// lives here.
pub trait Handler<I: InstructionSet> {
    /// Perform `instr` and yield the value it is indexed by
    fn handle(&self, instr: &I) -> Value;

    /// Called for every `Return` node; `outermost` when it ends the program
    fn on_return(&self, _outermost: bool) {}
}

/* ===================== Public API ===================== */

/// Interpret `program` from scratch with `handler`
pub fn run<I, A, H>(program: &Program<I, A>, handler: &H) -> A
where
    I: InstructionSet,
    A: Data,
    H: Handler<I> + ?Sized,
{
    let mut vm = Vm::new(program);
    run_until_done(&mut vm, handler)
}

/// Run the VM until it completes and return the program's value
pub fn run_until_done<I, A, H>(vm: &mut Vm<I, A>, handler: &H) -> A
where
    I: InstructionSet,
    A: Data,
    H: Handler<I> + ?Sized,
{
    loop {
        match step(vm, handler) {
            Step::Continue => continue,
            Step::Done(value) => return value,
        }
    }
}

/// Execute one step of the VM
///
/// Panics if called again after returning `Step::Done`.
pub fn step<I, A, H>(vm: &mut Vm<I, A>, handler: &H) -> Step<A>
where
    I: InstructionSet,
    A: Data,
    H: Handler<I> + ?Sized,
{
    let Some(node) = vm.current.take() else {
        panic!("Internal error: step() called on a finished VM");
    };

    let value = match &*node {
        Node::AndThen(first, continuation) => {
            vm.continuations.push(continuation.clone());
            vm.current = Some(first.clone());
            return Step::Continue;
        }

        Node::Return(value) => {
            handler.on_return(vm.continuations.is_empty());
            value.clone()
        }

        Node::Instruction(instr) => {
            trace!(?instr, depth = vm.continuations.len(), "Instruction");
            handler.handle(instr)
        }
    };

    deliver(vm, value)
}

/* ===================== Continuations ===================== */

/// Feed a ready value to the innermost continuation, or finish
fn deliver<I, A>(vm: &mut Vm<I, A>, value: Value) -> Step<A>
where
    I: InstructionSet,
    A: Data,
{
    match vm.continuations.pop() {
        Some(continuation) => {
            vm.current = Some(continuation(value));
            Step::Continue
        }
        None => Step::Done(unerase(value)),
    }
}
