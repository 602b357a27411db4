//! # Fibers
//!
//! A fiber is a handle to a computation that runs independently of whoever
//! holds the handle. `get_result()` blocks until the value is available. It
//! never times out and there is no way to cancel the computation.
//!
//! Two backends share the [`FiberBackend`] interface:
//!
//! - [`MemoizingFiber`]: starts its action once, eagerly, on a [`Spawner`];
//!   every reader sees the same value
//! - [`RecomputingFiber`]: stores the action and re-runs it on every read;
//!   a test utility that is only sound for pure actions
//!
//! The backend is chosen where the fiber is constructed. The fork-join
//! interpreter always builds memoizing fibers.

mod memoizing;
mod recomputing;

pub use memoizing::MemoizingFiber;
pub use recomputing::RecomputingFiber;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use crate::program::{erase, unerase, Data, Value};
use crate::spawner::Spawner;

/// Type-erased zero-argument action run by a fiber
pub type Action = Arc<dyn Fn() -> Value + Send + Sync>;

/* ===================== Identity ===================== */

/// Diagnostic identity of a fiber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiberId(Uuid);

impl FiberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FiberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/* ===================== Backends ===================== */

/// Fiber implementation contract
pub trait FiberBackend: Send + Sync {
    fn id(&self) -> FiberId;

    /// Block until the computation's value is available and return it
    fn get_result(&self) -> Value;
}

/// Untyped, shareable fiber handle
#[derive(Clone)]
pub struct RawFiber(Arc<dyn FiberBackend>);

impl RawFiber {
    pub fn new(backend: impl FiberBackend + 'static) -> Self {
        Self(Arc::new(backend))
    }

    pub fn id(&self) -> FiberId {
        self.0.id()
    }

    pub fn get_result(&self) -> Value {
        self.0.get_result()
    }
}

impl fmt::Debug for RawFiber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawFiber({})", self.id())
    }
}

/* ===================== Typed Handle ===================== */

/// Handle to an independently running computation producing an `A`
///
/// Cloning the handle shares the underlying fiber.
pub struct Fiber<A> {
    raw: RawFiber,
    _yields: PhantomData<fn() -> A>,
}

impl<A> Clone for Fiber<A> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _yields: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Fiber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fiber({})", self.raw.id())
    }
}

impl<A: Data> Fiber<A> {
    /// Wrap an untyped handle whose backend yields `A` values
    pub(crate) fn from_raw(raw: RawFiber) -> Self {
        Self {
            raw,
            _yields: PhantomData,
        }
    }

    /// Start `action` on `spawner` now; every read returns its single result
    pub fn memoizing<F>(action: F, spawner: &dyn Spawner) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        let action: Action = Arc::new(move || erase(action()));
        Self::from_raw(RawFiber::new(MemoizingFiber::start(
            FiberId::new(),
            action,
            spawner,
        )))
    }

    /// Store `action`; every read runs it again from scratch
    pub fn recomputing<F>(action: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        let action: Action = Arc::new(move || erase(action()));
        Self::from_raw(RawFiber::new(RecomputingFiber::new(action)))
    }

    pub fn id(&self) -> FiberId {
        self.raw.id()
    }

    pub fn raw(&self) -> &RawFiber {
        &self.raw
    }

    /// Block until the value is available
    ///
    /// Panics if the fiber's action panicked. There is no typed failure
    /// channel.
    pub fn get_result(&self) -> A {
        unerase(self.raw.get_result())
    }
}
