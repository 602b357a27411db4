//! # Program algebra
//!
//! A `Program<I, A>` is an immutable description of a computation over the
//! instruction set `I` that eventually yields an `A`. Building a program runs
//! nothing; an interpreter walks the tree and performs the instructions.
//!
//! ## Node shapes
//!
//! 1. **Return**: yields a value, performs no effects
//! 2. **Instruction**: performs exactly one primitive effect
//! 3. **AndThen**: runs a program, then feeds its result into a continuation
//!    that produces the next program
//!
//! Node payloads are type-erased (`Value`) so one driver can walk any tree.
//! The typed facade guarantees every continuation receives the type it was
//! written against. Nodes are reference-counted and never mutated, so
//! composing programs shares structure instead of copying it.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::sync::{Arc, OnceLock};

/* ===================== Values ===================== */

/// Anything a program may yield.
///
/// `Clone` because a program value can be interpreted more than once and a
/// fiber result can be read by many awaiters.
pub trait Data: Any + Clone + Send + Sync {}

impl<T: Any + Clone + Send + Sync> Data for T {}

/// Type-erased program value
pub type Value = Arc<dyn Any + Send + Sync>;

/// Erase a typed value
pub fn erase<A: Data>(value: A) -> Value {
    Arc::new(value)
}

/// Recover a typed value from an erased one
///
/// Panics if the value is not an `A`. The typed constructors make this
/// unreachable unless a handler yields the wrong type for an instruction.
pub fn unerase<A: Data>(value: Value) -> A {
    match value.downcast::<A>() {
        Ok(typed) => Arc::try_unwrap(typed).unwrap_or_else(|shared| (*shared).clone()),
        Err(_) => panic!(
            "Internal error: program value is not a {}",
            std::any::type_name::<A>()
        ),
    }
}

/* ===================== Instruction Sets ===================== */

/// A family of primitive effects
///
/// Programs are generic over their instruction set, so a new family reuses
/// the algebra, the combinators and the interpreter driver unchanged. Only
/// the [`Handler`](crate::interpreter::Handler) is family-specific.
pub trait InstructionSet: fmt::Debug + Send + Sync + 'static {}

/// An operation of `I` indexed by the type `A` it yields when handled
pub struct Instruction<I, A> {
    op: I,
    _yields: PhantomData<fn() -> A>,
}

impl<I: InstructionSet, A: Data> Instruction<I, A> {
    /// Index `op` by its result type.
    ///
    /// Whoever handles `I` must yield an `A` for this operation.
    pub fn new(op: I) -> Self {
        Self {
            op,
            _yields: PhantomData,
        }
    }

    pub fn op(&self) -> &I {
        &self.op
    }
}

impl<I: fmt::Debug, A> fmt::Debug for Instruction<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instruction").field(&self.op).finish()
    }
}

/* ===================== Tree ===================== */

/// Continuation of an `AndThen` node
pub(crate) type Continuation<I> = Arc<dyn Fn(Value) -> Arc<Node<I>> + Send + Sync>;

/// Program tree node
pub(crate) enum Node<I> {
    Return(Value),
    Instruction(I),
    AndThen(Arc<Node<I>>, Continuation<I>),
}

impl<I> Node<I> {
    /// Walk the `first` spine down to the node that runs first
    ///
    /// Returns that node and how many `AndThen`s wrap it.
    fn leftmost(&self) -> (&Node<I>, usize) {
        let mut node = self;
        let mut depth = 0;
        while let Node::AndThen(first, _) = node {
            node = &**first;
            depth += 1;
        }
        (node, depth)
    }
}

impl<I: fmt::Debug> fmt::Debug for Node<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.leftmost() {
            (Node::Return(_), 0) => f.write_str("Return(..)"),
            (Node::Instruction(op), 0) => f.debug_tuple("Instruction").field(op).finish(),
            (first, depth) => f
                .debug_struct("AndThen")
                .field("depth", &depth)
                .field("first", first)
                .finish_non_exhaustive(),
        }
    }
}

/// Left-nested chains are torn down with an explicit worklist so dropping a
/// long program never recurses once per `AndThen`.
impl<I> Drop for Node<I> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_first(self, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_first(&mut node, &mut pending);
        }
    }
}

/// Move a uniquely owned `AndThen` child out of `node` onto `pending`
fn detach_first<I>(node: &mut Node<I>, pending: &mut Vec<Node<I>>) {
    let Node::AndThen(first, _) = node else {
        return;
    };
    if let Some(child) = Arc::get_mut(first) {
        if matches!(child, Node::AndThen(..)) {
            pending.push(mem::replace(child, Node::Return(detached())));
        }
    }
}

fn detached() -> Value {
    static DETACHED: OnceLock<Value> = OnceLock::new();
    DETACHED.get_or_init(|| Arc::new(())).clone()
}

/* ===================== Program ===================== */

/// Immutable description of a computation over `I` yielding `A`
pub struct Program<I, A> {
    node: Arc<Node<I>>,
    _yields: PhantomData<fn() -> A>,
}

impl<I, A> Clone for Program<I, A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            _yields: PhantomData,
        }
    }
}

impl<I: fmt::Debug, A> fmt::Debug for Program<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Program").field(&self.node).finish()
    }
}

impl<I: InstructionSet, A: Data> Program<I, A> {
    fn from_node(node: Node<I>) -> Self {
        Self {
            node: Arc::new(node),
            _yields: PhantomData,
        }
    }

    /// A program that performs no effects and yields `value`
    pub fn from_value(value: A) -> Self {
        Self::from_node(Node::Return(erase(value)))
    }

    /// A program that performs exactly one instruction
    pub fn from_instruction(instruction: Instruction<I, A>) -> Self {
        Self::from_node(Node::Instruction(instruction.op))
    }

    /// Run this program, then run the program `f` builds from its result
    ///
    /// `f` may be called once per interpretation, hence `Fn`.
    pub fn and_then<B, F>(self, f: F) -> Program<I, B>
    where
        B: Data,
        F: Fn(A) -> Program<I, B> + Send + Sync + 'static,
    {
        let continuation: Continuation<I> = Arc::new(move |value| f(unerase::<A>(value)).node);
        Program::from_node(Node::AndThen(self.node, continuation))
    }

    /// Transform the result without performing further effects
    pub fn map<B, G>(self, g: G) -> Program<I, B>
    where
        B: Data,
        G: Fn(A) -> B + Send + Sync + 'static,
    {
        self.and_then(move |a| Program::from_value(g(a)))
    }

    /// Run this program for its effects, then run `next`
    pub fn then<B: Data>(self, next: Program<I, B>) -> Program<I, B> {
        self.and_then(move |_| next.clone())
    }

    /// Run this program, then `other`, and pair their results
    pub fn zip<B: Data>(self, other: Program<I, B>) -> Program<I, (A, B)> {
        self.and_then(move |a| other.clone().map(move |b| (a.clone(), b)))
    }

    /// Run `programs` in order and collect their results
    pub fn sequence(programs: Vec<Program<I, A>>) -> Program<I, Vec<A>> {
        programs
            .into_iter()
            .fold(Program::from_value(Collected::empty()), |collected, program| {
                collected.and_then(move |done: Collected<A>| {
                    program.clone().map(move |value| done.push(value))
                })
            })
            .map(|collected| collected.to_vec())
    }

    pub(crate) fn node(&self) -> &Arc<Node<I>> {
        &self.node
    }
}

/* ===================== Collected Results ===================== */

/// Persistent list of results gathered by [`Program::sequence`], newest first
///
/// Pushing shares the earlier results, so continuations can be re-run
/// without copying what was collected so far.
struct Collected<A>(Option<Arc<Link<A>>>);

struct Link<A> {
    value: A,
    earlier: Collected<A>,
}

impl<A> Clone for Collected<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A: Data> Collected<A> {
    fn empty() -> Self {
        Self(None)
    }

    fn push(&self, value: A) -> Self {
        Self(Some(Arc::new(Link {
            value,
            earlier: self.clone(),
        })))
    }

    fn to_vec(&self) -> Vec<A> {
        let mut values = Vec::new();
        let mut cursor = self.0.as_deref();
        while let Some(link) = cursor {
            values.push(link.value.clone());
            cursor = link.earlier.0.as_deref();
        }
        values.reverse();
        values
    }
}

impl<A> Drop for Collected<A> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(link) = next {
            next = match Arc::try_unwrap(link) {
                Ok(mut link) => link.earlier.0.take(),
                Err(_) => None,
            };
        }
    }
}
