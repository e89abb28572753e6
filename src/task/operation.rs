// src/task/operation.rs

//! `Operation`: an execute hook wrapped in the task state machine.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::TaskOptions;
use crate::errors::Result;
use crate::state::{Announce, ObserverId, TaskCore, TaskId, Transition, TransitionObserver};
use crate::task::TaskHandle;
use crate::task::dependency::DependencySet;
use crate::task::execute::{Completion, Execute, FinishGuard};
use crate::types::{ExecutionStyle, TaskState};

/// A dependency-aware task wrapping any [`Execute`] implementation.
///
/// The scheduler drives it with:
///
/// 1. `is_ready()` — local readiness plus all dependencies finished
/// 2. `start()` — exactly once per task
/// 3. `is_finished()` / observers / `wait_finished()` to sequence dependents
pub struct Operation<E> {
    core: Arc<TaskCore>,
    dependencies: DependencySet,
    hook: E,
}

impl<E: Execute> Operation<E> {
    pub fn new(options: TaskOptions, hook: E) -> Self {
        Self {
            core: Arc::new(TaskCore::new(options)),
            dependencies: DependencySet::default(),
            hook,
        }
    }

    pub fn core(&self) -> &TaskCore {
        &self.core
    }

    /// Type-erased handle, used to make other operations depend on this one.
    pub fn handle(&self) -> TaskHandle {
        TaskHandle::from(Arc::clone(&self.core))
    }

    pub fn hook(&self) -> &E {
        &self.hook
    }

    pub fn id(&self) -> TaskId {
        self.core.id()
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn state(&self) -> TaskState {
        self.core.state()
    }

    pub fn is_executing(&self) -> bool {
        self.core.is_executing()
    }

    pub fn is_finished(&self) -> bool {
        self.core.is_finished()
    }

    pub fn is_asynchronous(&self) -> bool {
        self.core.is_asynchronous()
    }

    pub fn cancel(&self) {
        self.core.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.core.is_cancelled()
    }

    /// Aggregate readiness: not started, not cancelled and every dependency
    /// finished.
    ///
    /// A cancelled task is never reported ready. Whoever cancels a task that
    /// has not started yet is expected to call [`Operation::start`] to retire
    /// it; that skips the hook and finishes it immediately.
    pub fn is_ready(&self) -> bool {
        self.core.is_schedulable() && self.dependencies_finished()
    }

    /// Make this task wait for `dependency`. Only allowed before `start()`.
    pub fn add_dependency(&self, dependency: &TaskHandle) -> Result<()> {
        self.dependencies.add(&self.core, dependency)?;
        Ok(())
    }

    /// Drop the edge to `dependency`. Only allowed before `start()`.
    pub fn remove_dependency(&self, dependency: TaskId) -> Result<bool> {
        self.dependencies.remove(&self.core, dependency)
    }

    pub fn dependencies(&self) -> Vec<TaskId> {
        self.dependencies.ids()
    }

    pub fn unfinished_dependencies(&self) -> Vec<TaskId> {
        self.dependencies.unfinished(&self.core)
    }

    pub fn dependencies_finished(&self) -> bool {
        self.dependencies.all_finished(&self.core)
    }

    /// Run the task.
    ///
    /// A task cancelled before this call is finished without running the
    /// hook. Otherwise the task moves to `Executing` and the hook runs on the
    /// calling thread. For synchronous tasks the task is `Finished` when this
    /// returns; asynchronous tasks may still be `Executing`.
    ///
    /// Calling `start()` on a task that has already started returns the
    /// protocol violation reported by the state core, whether or not the
    /// task has been cancelled since.
    pub fn start(&self) -> Result<()> {
        if self.core.is_cancelled() {
            info!(
                task = %self.core.name(),
                id = %self.core.id(),
                "task cancelled before start; finishing without running"
            );
            return self.core.skip_execution();
        }

        let unfinished = self.unfinished_dependencies();
        if !unfinished.is_empty() {
            debug!(
                task = %self.core.name(),
                id = %self.core.id(),
                ?unfinished,
                "starting with unfinished dependencies"
            );
        }

        self.core.begin_executing()?;
        let completion = Completion::new(Arc::clone(&self.core));

        match self.core.style() {
            ExecutionStyle::Synchronous => {
                let _guard = FinishGuard::new(&self.core);
                self.hook.execute(completion);
            }
            ExecutionStyle::Asynchronous => {
                self.hook.execute(completion);
            }
        }

        Ok(())
    }

    pub fn observe(&self, observer: Arc<dyn TransitionObserver>) -> ObserverId {
        self.core.observe(observer)
    }

    pub fn observe_fn<F>(&self, f: F) -> ObserverId
    where
        F: Fn(Announce, &Transition) + Send + Sync + 'static,
    {
        self.core.observe_fn(f)
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.core.unobserve(id)
    }

    pub async fn wait_finished(&self) {
        self.core.wait_finished().await
    }
}

impl<E> std::fmt::Debug for Operation<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("core", &self.core)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}
