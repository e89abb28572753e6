// src/state/observer.rs

//! Explicit observer registration for task state transitions.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::TaskId;
use crate::types::TaskState;

/// A single state change of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub task: TaskId,
    pub from: TaskState,
    pub to: TaskState,
}

/// Which side of a transition a notification is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announce {
    /// The new state is not yet visible to readers.
    Before,
    /// The new state is visible to readers.
    After,
}

/// Receives the announce-before / announce-after pair for every transition
/// of the tasks it is registered on.
///
/// Callbacks run on the thread performing the transition, with no lock held.
/// They may read any predicate, register observers or cancel tasks. A
/// callback that tries to transition the same task gets
/// `TaskError::TransitionInProgress`.
///
/// Callbacks should not panic. A synchronous task whose hook panics is
/// finished while the panic unwinds; an observer panicking during that
/// finish is a panic inside a panic and aborts the process.
pub trait TransitionObserver: Send + Sync {
    fn will_transition(&self, _transition: &Transition) {}

    fn did_transition(&self, _transition: &Transition) {}
}

/// Adapter so a plain closure can observe both sides of a transition.
pub struct FnObserver<F>(pub F);

impl<F> TransitionObserver for FnObserver<F>
where
    F: Fn(Announce, &Transition) + Send + Sync,
{
    fn will_transition(&self, transition: &Transition) {
        (self.0)(Announce::Before, transition)
    }

    fn did_transition(&self, transition: &Transition) {
        (self.0)(Announce::After, transition)
    }
}

/// Token returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered list of observers for one task.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: AtomicU64,
    entries: RwLock<Vec<(ObserverId, Arc<dyn TransitionObserver>)>>,
}

impl ObserverRegistry {
    pub(crate) fn register(&self, observer: Arc<dyn TransitionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, observer));
        id
    }

    pub(crate) fn unregister(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Copy of the current observers in registration order.
    ///
    /// Dispatch iterates the snapshot so the lock is never held while
    /// observer code runs.
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn TransitionObserver>> {
        self.entries
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}
