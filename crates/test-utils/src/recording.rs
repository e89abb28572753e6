#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use taskstate::{Announce, Completion, Execute, TaskCore, TaskState, Transition, TransitionObserver};

/// One notification as seen by a [`RecordingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observed {
    pub announce: Announce,
    pub transition: Transition,
    /// State read from the task inside the callback, if probing.
    pub seen: Option<TaskState>,
}

/// Observer that records every notification it receives.
///
/// When built with [`RecordingObserver::probing`], it also reads the task's
/// visible state from inside each callback.
#[derive(Default)]
pub struct RecordingObserver {
    probe: Option<Weak<TaskCore>>,
    events: Mutex<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn probing(task: &Arc<TaskCore>) -> Arc<Self> {
        Arc::new(Self {
            probe: Some(Arc::downgrade(task)),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().clone()
    }

    /// `(announce, from, to)` triples, in delivery order.
    pub fn sequence(&self) -> Vec<(Announce, TaskState, TaskState)> {
        self.events
            .lock()
            .iter()
            .map(|e| (e.announce, e.transition.from, e.transition.to))
            .collect()
    }

    /// Whether any "after" notification reported a move into `state`.
    pub fn entered(&self, state: TaskState) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| e.announce == Announce::After && e.transition.to == state)
    }

    fn record(&self, announce: Announce, transition: &Transition) {
        let seen = self
            .probe
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|task| task.state());
        self.events.lock().push(Observed {
            announce,
            transition: *transition,
            seen,
        });
    }
}

impl TransitionObserver for RecordingObserver {
    fn will_transition(&self, transition: &Transition) {
        self.record(Announce::Before, transition);
    }

    fn did_transition(&self, transition: &Transition) {
        self.record(Announce::After, transition);
    }
}

/// Execute hook that counts how often it ran.
///
/// With `finishes = false` it returns without calling `finish()`, leaving
/// completion to the wrapper (synchronous) or to nobody (asynchronous).
#[derive(Debug, Default)]
pub struct CountingHook {
    runs: AtomicUsize,
    finishes: bool,
}

impl CountingHook {
    pub fn finishing() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            finishes: true,
        }
    }

    pub fn returning() -> Self {
        Self {
            runs: AtomicUsize::new(0),
            finishes: false,
        }
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Execute for CountingHook {
    fn execute(&self, completion: Completion) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.finishes {
            completion.finish().expect("hook finish failed");
        }
    }
}

/// Execute hook that keeps its completion so the test can finish it later.
#[derive(Debug, Default)]
pub struct ParkedHook {
    runs: AtomicUsize,
    parked: Mutex<Option<Completion>>,
}

impl ParkedHook {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Take the completion handed to the last run, if any.
    pub fn take(&self) -> Option<Completion> {
        self.parked.lock().take()
    }
}

impl Execute for ParkedHook {
    fn execute(&self, completion: Completion) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.parked.lock() = Some(completion);
    }
}
