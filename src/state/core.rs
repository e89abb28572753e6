// src/state/core.rs

//! The per-task state machine.
//!
//! State lives in a single `AtomicU8` so predicate reads never block:
//!
//! ```text
//!   bit 0-1  visible state (Ready / Executing / Finished)
//!   bit 2    IN_FLIGHT: a writer owns the task for the current transition
//!   bit 3-4  target state of the in-flight transition
//! ```
//!
//! A writer claims the task with a compare-and-swap that sets `IN_FLIGHT`,
//! announces "before", publishes the new visible state, announces "after",
//! and finally clears `IN_FLIGHT`. A second writer that arrives while a
//! transition is in flight is rejected instead of blocking.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::TaskOptions;
use crate::errors::{Result, TaskError};
use crate::state::observer::{FnObserver, ObserverId, ObserverRegistry, Transition, TransitionObserver};
use crate::state::{Announce, TaskId};
use crate::types::{ExecutionStyle, FinishPolicy, TaskState};

const STATE_MASK: u8 = 0b0_0011;
const IN_FLIGHT: u8 = 0b0_0100;
const TARGET_SHIFT: u8 = 3;

fn visible(phase: u8) -> TaskState {
    TaskState::from_bits(phase & STATE_MASK)
}

fn in_flight_to(phase: u8) -> Option<TaskState> {
    if phase & IN_FLIGHT == 0 {
        None
    } else {
        Some(TaskState::from_bits((phase >> TARGET_SHIFT) & STATE_MASK))
    }
}

fn claimed(from: TaskState, to: TaskState) -> u8 {
    from.to_bits() | IN_FLIGHT | (to.to_bits() << TARGET_SHIFT)
}

/// Lifecycle state and cancellation flag of a single unit of work.
pub struct TaskCore {
    id: TaskId,
    name: String,
    style: ExecutionStyle,
    repeated_finish: FinishPolicy,
    phase: AtomicU8,
    cancelled: AtomicBool,
    observers: ObserverRegistry,
    state_tx: watch::Sender<TaskState>,
}

impl TaskCore {
    /// Create a task in the `Ready` state, not cancelled, with no observers.
    pub fn new(options: TaskOptions) -> Self {
        let (state_tx, _) = watch::channel(TaskState::Ready);
        Self {
            id: TaskId::next(),
            name: options.name,
            style: options.style,
            repeated_finish: options.repeated_finish,
            phase: AtomicU8::new(TaskState::Ready.to_bits()),
            cancelled: AtomicBool::new(false),
            observers: ObserverRegistry::default(),
            state_tx,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> ExecutionStyle {
        self.style
    }

    /// Whether `finish()` may happen on another thread after `start()` returns.
    pub fn is_asynchronous(&self) -> bool {
        self.style == ExecutionStyle::Asynchronous
    }

    pub fn repeated_finish(&self) -> FinishPolicy {
        self.repeated_finish
    }

    /// Currently visible state.
    pub fn state(&self) -> TaskState {
        visible(self.phase.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == TaskState::Ready
    }

    pub fn is_executing(&self) -> bool {
        self.state() == TaskState::Executing
    }

    pub fn is_finished(&self) -> bool {
        self.state() == TaskState::Finished
    }

    /// Local readiness: still `Ready`, no transition claimed, not cancelled.
    ///
    /// Dependency completion is not part of this check.
    pub fn is_schedulable(&self) -> bool {
        self.phase.load(Ordering::Acquire) == TaskState::Ready.to_bits() && !self.is_cancelled()
    }

    /// True once any writer has claimed a transition out of `Ready`.
    pub fn has_started(&self) -> bool {
        self.phase.load(Ordering::Acquire) != TaskState::Ready.to_bits()
    }

    /// True if the task is finished or a finish is already in flight.
    pub(crate) fn finish_requested(&self) -> bool {
        let phase = self.phase.load(Ordering::Acquire);
        visible(phase).is_terminal() || in_flight_to(phase) == Some(TaskState::Finished)
    }

    /// Mark the task cancelled.
    ///
    /// Only consulted when the task is started; an executing task keeps
    /// running and must poll [`TaskCore::is_cancelled`] to stop early.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!(task = %self.name, id = %self.id, state = %self.state(), "task cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Ready -> Executing`.
    ///
    /// Any other starting point is a protocol violation: the error is logged
    /// at `error` level and returned, and the state is left untouched.
    pub fn begin_executing(&self) -> Result<()> {
        self.transition_from_ready(TaskState::Executing)
    }

    /// `Ready -> Finished` without executing, used to retire a cancelled task.
    ///
    /// Unlike [`TaskCore::finish`] this only succeeds from an unclaimed
    /// `Ready`; a task that already started gets `IllegalTransition`
    /// regardless of its [`FinishPolicy`].
    pub fn skip_execution(&self) -> Result<()> {
        self.transition_from_ready(TaskState::Finished)
    }

    fn transition_from_ready(&self, to: TaskState) -> Result<()> {
        let ready = TaskState::Ready.to_bits();
        let claim = claimed(TaskState::Ready, to);

        if let Err(current) =
            self.phase
                .compare_exchange(ready, claim, Ordering::AcqRel, Ordering::Acquire)
        {
            let err = match in_flight_to(current) {
                Some(_) => TaskError::TransitionInProgress {
                    task: self.name.clone(),
                },
                None => TaskError::IllegalTransition {
                    task: self.name.clone(),
                    from: visible(current),
                    to,
                },
            };
            error!(task = %self.name, id = %self.id, %to, error = %err, "transition from ready rejected");
            return Err(err);
        }

        self.publish(TaskState::Ready, to);
        Ok(())
    }

    /// Any non-terminal state `-> Finished`.
    ///
    /// A repeated finish follows the task's [`FinishPolicy`]. Finishing while
    /// another writer's transition is in flight is rejected with
    /// `TransitionInProgress`, unless that transition is itself a finish.
    ///
    /// In that last case, under `FinishPolicy::Ignore`, `Ok(())` is returned
    /// as soon as the other finish is claimed: the task may still read as
    /// not finished until that writer's notifications complete. Use
    /// [`TaskCore::wait_finished`] to wait for the visible state.
    pub fn finish(&self) -> Result<()> {
        let mut current = self.phase.load(Ordering::Acquire);

        loop {
            match in_flight_to(current) {
                Some(TaskState::Finished) => return self.repeated_finish_result(),
                Some(_) => {
                    let err = TaskError::TransitionInProgress {
                        task: self.name.clone(),
                    };
                    error!(task = %self.name, id = %self.id, error = %err, "finish rejected");
                    return Err(err);
                }
                None => {}
            }

            let from = visible(current);
            if from.is_terminal() {
                return self.repeated_finish_result();
            }

            match self.phase.compare_exchange_weak(
                current,
                claimed(from, TaskState::Finished),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.publish(from, TaskState::Finished);
                    return Ok(());
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn repeated_finish_result(&self) -> Result<()> {
        match self.repeated_finish {
            FinishPolicy::Ignore => {
                debug!(task = %self.name, id = %self.id, "repeated finish ignored");
                Ok(())
            }
            FinishPolicy::Reject => {
                let err = TaskError::AlreadyFinished {
                    task: self.name.clone(),
                };
                error!(task = %self.name, id = %self.id, error = %err, "finish rejected");
                Err(err)
            }
        }
    }

    /// Announce, publish and announce again. The caller holds the claim.
    fn publish(&self, from: TaskState, to: TaskState) {
        let transition = Transition {
            task: self.id,
            from,
            to,
        };
        let mut release = Release {
            phase: &self.phase,
            settled: from.to_bits(),
        };
        let observers = self.observers.snapshot();

        for observer in &observers {
            observer.will_transition(&transition);
        }

        self.phase.store(claimed(to, to), Ordering::Release);
        release.settled = to.to_bits();
        self.state_tx.send_replace(to);
        debug!(task = %self.name, id = %self.id, %from, %to, "state transition");

        for observer in &observers {
            observer.did_transition(&transition);
        }

        drop(release);
    }

    /// Register an observer; it receives every later transition.
    pub fn observe(&self, observer: Arc<dyn TransitionObserver>) -> ObserverId {
        self.observers.register(observer)
    }

    /// Register a closure called with `Announce::Before` and `Announce::After`.
    pub fn observe_fn<F>(&self, f: F) -> ObserverId
    where
        F: Fn(Announce, &Transition) + Send + Sync + 'static,
    {
        self.observe(Arc::new(FnObserver(f)))
    }

    /// Returns `false` if the id was not registered on this task.
    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Resolve once the task is `Finished`.
    ///
    /// A task whose hook never finishes leaves this pending forever; wrap it
    /// in a timeout when used as a watchdog.
    pub async fn wait_finished(&self) {
        let mut rx = self.state_tx.subscribe();
        if rx.wait_for(|state| state.is_terminal()).await.is_err() {
            // The sender lives as long as `self`, so this is unreachable in practice.
            warn!(task = %self.name, id = %self.id, "state channel closed while waiting");
        }
    }
}

/// Clears the in-flight claim even if an observer panics.
struct Release<'a> {
    phase: &'a AtomicU8,
    settled: u8,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.phase.store(self.settled, Ordering::Release);
    }
}

impl fmt::Debug for TaskCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCore")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("cancelled", &self.is_cancelled())
            .field("style", &self.style)
            .field("observers", &self.observers)
            .finish()
    }
}
