//! Scheduling contexts for effect execution.
//!
//! A [`Scheduler`] is the opaque handle identifying where effect tasks run
//! and where their completions are delivered. Reducers treat it as a token
//! carried in their environment; only the store calls into it.

use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use tokio::task::AbortHandle;

/// Executor seam for effect tasks. Implementations decide where the task
/// runs and must return a handle through which it can be aborted.
pub trait Spawn: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> TaskHandle;
}

/// Opaque, cheaply-cloneable scheduling context.
///
/// The two built-in flavors cover production and tests:
///
/// - [`Scheduler::tokio`] spawns onto the ambient tokio runtime and supports
///   abort-based cancellation.
/// - [`Scheduler::immediate`] runs each task to completion on the caller's
///   thread, making effect delivery deterministic for tests whose fakes
///   return ready futures.
#[derive(Clone)]
pub struct Scheduler {
    spawner: Arc<dyn Spawn>,
}

impl Scheduler {
    /// Schedule tasks on the current tokio runtime.
    pub fn tokio() -> Self {
        Scheduler {
            spawner: Arc::new(TokioSpawner),
        }
    }

    /// Run each task synchronously, to completion, at spawn time.
    pub fn immediate() -> Self {
        Scheduler {
            spawner: Arc::new(ImmediateSpawner),
        }
    }

    /// Wrap a custom executor.
    pub fn from_spawner(spawner: Arc<dyn Spawn>) -> Self {
        Scheduler { spawner }
    }

    pub(crate) fn spawn(&self, task: BoxFuture<'static, ()>) -> TaskHandle {
        self.spawner.spawn(task)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Scheduler")
    }
}

/// Handle to a scheduled effect task. Cancelling is best-effort: a task that
/// already completed has nothing left to abort.
pub struct TaskHandle {
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Handle for a task that cannot be aborted (already completed, or the
    /// executor offers no cancellation).
    pub fn detached() -> Self {
        TaskHandle { abort: None }
    }

    /// Handle backed by a tokio [`AbortHandle`].
    pub fn abortable(handle: AbortHandle) -> Self {
        TaskHandle {
            abort: Some(handle),
        }
    }

    /// Abort the underlying task if it is still running.
    pub fn cancel(&self) {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }
}

/// Environments that carry a scheduling context. The store reaches through
/// this seam to execute the effects its reducer returns.
pub trait HasScheduler {
    fn scheduler(&self) -> &Scheduler;
}

struct TokioSpawner;

impl Spawn for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> TaskHandle {
        let handle = tokio::spawn(task);
        TaskHandle::abortable(handle.abort_handle())
    }
}

struct ImmediateSpawner;

impl Spawn for ImmediateSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> TaskHandle {
        futures::executor::block_on(task);
        TaskHandle::detached()
    }
}
