//! Virtual Machine state
//!
//! The VM holds all evaluation state:
//! - current: the node about to be evaluated
//! - continuations: pending `AndThen` continuations, innermost last

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::program::{Continuation, Data, InstructionSet, Node, Program};

/* ===================== VM ===================== */

/// Evaluation state for one run of a `Program<I, A>`
pub struct Vm<I, A> {
    pub(crate) current: Option<Arc<Node<I>>>,
    pub(crate) continuations: Vec<Continuation<I>>,
    _yields: PhantomData<fn() -> A>,
}

impl<I: InstructionSet, A: Data> Vm<I, A> {
    /// Create a VM positioned at the root of `program`
    pub fn new(program: &Program<I, A>) -> Self {
        Self {
            current: Some(Arc::clone(program.node())),
            continuations: Vec::new(),
            _yields: PhantomData,
        }
    }

    /// Number of continuations waiting for a value
    pub fn depth(&self) -> usize {
        self.continuations.len()
    }

    /// Whether the program has produced its final value
    pub fn is_done(&self) -> bool {
        self.current.is_none()
    }
}

impl<I: fmt::Debug, A> fmt::Debug for Vm<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("current", &self.current)
            .field("depth", &self.continuations.len())
            .finish()
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<A> {
    /// Continue to next step
    Continue,
    /// Execution complete with the program's value
    Done(A),
}
