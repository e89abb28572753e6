// src/types.rs

//! Small value types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Lifecycle state of a task.
///
/// The only legal order is `Ready -> Executing -> Finished`, with the single
/// shortcut `Ready -> Finished` taken when a cancelled task is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskState {
    Ready,
    Executing,
    Finished,
}

impl TaskState {
    /// `Finished` is the only terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Finished)
    }

    pub(crate) const fn to_bits(self) -> u8 {
        match self {
            TaskState::Ready => 0,
            TaskState::Executing => 1,
            TaskState::Finished => 2,
        }
    }

    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits {
            0 => TaskState::Ready,
            1 => TaskState::Executing,
            _ => TaskState::Finished,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Ready => "ready",
            TaskState::Executing => "executing",
            TaskState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// How a task's execute hook signals completion.
///
/// - `Synchronous`: the hook is done when it returns; the task is finished
///   on every exit path from the hook.
/// - `Asynchronous`: the hook may hand its completion off to another thread
///   and finish later. Callers must not assume the task is finished when
///   `start()` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStyle {
    #[default]
    Synchronous,
    Asynchronous,
}

impl FromStr for ExecutionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "synchronous" | "sync" => Ok(ExecutionStyle::Synchronous),
            "asynchronous" | "async" => Ok(ExecutionStyle::Asynchronous),
            other => Err(format!(
                "invalid execution style: {other} (expected \"synchronous\" or \"asynchronous\")"
            )),
        }
    }
}

/// What `finish()` does when the task is already finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishPolicy {
    /// Report `TaskError::AlreadyFinished`.
    #[default]
    Reject,
    /// Treat the repeated call as a no-op.
    Ignore,
}

impl FromStr for FinishPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(FinishPolicy::Reject),
            "ignore" => Ok(FinishPolicy::Ignore),
            other => Err(format!(
                "invalid repeated_finish policy: {other} (expected \"reject\" or \"ignore\")"
            )),
        }
    }
}

/// Log verbosity accepted by [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("invalid log level: {other}")),
        }
    }
}
