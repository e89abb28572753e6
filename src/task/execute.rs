// src/task/execute.rs

//! The execute hook and the completion handle passed to it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::state::TaskCore;
use crate::task::TaskHandle;
use crate::types::TaskState;

/// Work performed by an [`crate::task::Operation`] once it starts executing.
///
/// Every path through `execute` must eventually finish the task exactly
/// once through the given [`Completion`]:
///
/// - synchronous tasks are finished automatically when `execute` returns
///   (or unwinds) if the hook did not finish them itself;
/// - asynchronous tasks may move the completion to another thread and
///   finish later. A hook that drops every clone without finishing leaves
///   the task in `Executing` for good.
pub trait Execute: Send + Sync {
    fn execute(&self, completion: Completion);
}

impl<F> Execute for F
where
    F: Fn(Completion) + Send + Sync,
{
    fn execute(&self, completion: Completion) {
        self(completion)
    }
}

/// Handle used by an execute hook to report completion.
#[derive(Clone)]
pub struct Completion {
    core: Arc<TaskCore>,
}

impl Completion {
    pub(crate) fn new(core: Arc<TaskCore>) -> Self {
        Self { core }
    }

    /// Move the task to `Finished`.
    pub fn finish(&self) -> Result<()> {
        self.core.finish()
    }

    /// Long-running hooks poll this to stop early.
    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    pub fn state(&self) -> TaskState {
        self.core.state()
    }

    pub fn task(&self) -> TaskHandle {
        TaskHandle::from(Arc::clone(&self.core))
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("task", &self.core.id())
            .field("state", &self.core.state())
            .finish()
    }
}

/// Finishes a synchronous task when the hook's stack frame is left.
pub(crate) struct FinishGuard<'a> {
    core: &'a TaskCore,
}

impl<'a> FinishGuard<'a> {
    pub(crate) fn new(core: &'a TaskCore) -> Self {
        Self { core }
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if self.core.finish_requested() {
            return;
        }

        if std::thread::panicking() {
            warn!(
                task = %self.core.name(),
                id = %self.core.id(),
                "execute hook panicked; finishing task"
            );
        } else {
            debug!(
                task = %self.core.name(),
                id = %self.core.id(),
                "execute hook returned without finishing; finishing on exit"
            );
        }

        if let Err(err) = self.core.finish() {
            warn!(
                task = %self.core.name(),
                id = %self.core.id(),
                error = %err,
                "could not finish task on hook exit"
            );
        }
    }
}
