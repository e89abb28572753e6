// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskState;

#[derive(Error, Debug)]
pub enum TaskError {
    /// A transition was requested from a state that does not allow it.
    ///
    /// This is a scheduler bug (e.g. starting the same task twice), not a
    /// normal error path.
    #[error("illegal transition for task '{task}': {from} -> {to}")]
    IllegalTransition {
        task: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("task '{task}' is already finished")]
    AlreadyFinished { task: String },

    /// Another writer is still in the middle of a transition on this task.
    #[error("task '{task}' has a transition in progress")]
    TransitionInProgress { task: String },

    #[error("cannot change dependency '{dependency}' of task '{task}' after it has started")]
    DependencyAfterStart { task: String, dependency: String },

    #[error("task '{task}' cannot depend on itself")]
    SelfDependency { task: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    /// Whether this error indicates a caller violating the task protocol.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            TaskError::IllegalTransition { .. }
                | TaskError::AlreadyFinished { .. }
                | TaskError::TransitionInProgress { .. }
                | TaskError::DependencyAfterStart { .. }
                | TaskError::SelfDependency { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
