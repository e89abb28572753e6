// src/task/mod.rs

//! Dependency-aware tasks built on the state core.
//!
//! - [`execute`] defines the [`Execute`] hook and the [`Completion`] handle.
//! - [`dependency`] holds the non-owning dependency set.
//! - [`operation`] wraps a hook into an [`Operation`] with a `start()` entry
//!   point.

pub mod dependency;
pub mod execute;
pub mod operation;

use std::ops::Deref;
use std::sync::Arc;

use crate::state::TaskCore;

pub use dependency::DependencySet;
pub use execute::{Completion, Execute};
pub use operation::Operation;

/// Shared, type-erased reference to a task's state core.
///
/// Operations with different hook types refer to each other through this.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    core: Arc<TaskCore>,
}

impl TaskHandle {
    pub fn core(&self) -> &Arc<TaskCore> {
        &self.core
    }
}

impl From<Arc<TaskCore>> for TaskHandle {
    fn from(core: Arc<TaskCore>) -> Self {
        Self { core }
    }
}

impl Deref for TaskHandle {
    type Target = TaskCore;

    fn deref(&self) -> &TaskCore {
        &self.core
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        self.core.id() == other.core.id()
    }
}

impl Eq for TaskHandle {}
