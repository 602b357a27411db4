//! Execution contexts for forked work
//!
//! A [`Spawner`] runs a job independently of the caller. The interpreter is
//! handed one explicitly instead of reaching for a process-wide default, so
//! tests can swap in the synchronous [`InlineSpawner`].
//!
//! None of the spawners bound concurrency, queue work or support
//! cancellation: a spawned job runs to completion.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::Error;

/// A unit of forked work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a job concurrently with the caller
pub trait Spawner: Send + Sync {
    fn spawn(&self, job: Job);
}

/* ===================== Spawners ===================== */

/// One OS thread per job
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) {
        std::thread::spawn(job);
    }
}

/// Runs jobs on a tokio runtime's blocking pool
///
/// Fiber actions may block or sleep, so they go through `spawn_blocking`
/// rather than onto the async workers.
///
/// The runtime behind the handle must outlive every fiber started on it.
/// Once it shuts down, new jobs are dropped without running; a memoizing
/// fiber logs a warning and panics on read rather than blocking forever.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawner for the runtime the caller is currently inside, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, job: Job) {
        // Detached: the join handle is not needed to read the result.
        drop(self.handle.spawn_blocking(job));
    }
}

/// Runs each job to completion on the spawning thread
///
/// Deterministic, which makes it the spawner of choice for tests. Eager
/// start still holds: the job has finished by the time `spawn` returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) {
        job();
    }
}

/* ===================== Selection ===================== */

/// Which spawner to build from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpawnerKind {
    #[default]
    Thread,
    Tokio,
    Inline,
}

impl SpawnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnerKind::Thread => "thread",
            SpawnerKind::Tokio => "tokio",
            SpawnerKind::Inline => "inline",
        }
    }
}

impl fmt::Display for SpawnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owns a spawner and whatever runtime keeps it alive
///
/// Dropping the host shuts down an owned tokio runtime, which waits for
/// blocking jobs that are still running.
pub struct SpawnerHost {
    spawner: Arc<dyn Spawner>,
    _runtime: Option<Runtime>,
}

impl SpawnerHost {
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, Error> {
        debug!(spawner = %config.spawner, "Building spawner");

        let host = match config.spawner {
            SpawnerKind::Thread => Self {
                spawner: Arc::new(ThreadSpawner),
                _runtime: None,
            },
            SpawnerKind::Inline => Self {
                spawner: Arc::new(InlineSpawner),
                _runtime: None,
            },
            SpawnerKind::Tokio => {
                let mut builder = Builder::new_multi_thread();
                builder.enable_all();
                if let Some(threads) = config.worker_threads {
                    builder.worker_threads(threads);
                }
                let runtime = builder.build().map_err(Error::Runtime)?;

                Self {
                    spawner: Arc::new(TokioSpawner::new(runtime.handle().clone())),
                    _runtime: Some(runtime),
                }
            }
        };

        Ok(host)
    }

    pub fn spawner(&self) -> Arc<dyn Spawner> {
        Arc::clone(&self.spawner)
    }
}

#[cfg(test)]
#[path = "spawner_tests.rs"]
mod tests;
