// src/state/mod.rs

//! Task state core.
//!
//! - [`core`] holds [`TaskCore`]: the atomic `Ready -> Executing -> Finished`
//!   state machine plus the cancellation flag.
//! - [`observer`] defines the explicit before/after notification API.

pub mod core;
pub mod observer;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use self::core::TaskCore;
pub use observer::{Announce, FnObserver, ObserverId, Transition, TransitionObserver};

/// Process-unique task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

impl TaskId {
    pub(crate) fn next() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
