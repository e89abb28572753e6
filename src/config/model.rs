// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{ExecutionStyle, FinishPolicy, LogLevel};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [defaults]
/// style = "synchronous"
/// repeated_finish = "reject"
///
/// [task.fetch-metadata]
/// style = "asynchronous"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub defaults: TaskOverrides,

    /// Per-task overrides from `[task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<String, TaskOverrides>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub logging: LoggingSection,
    pub defaults: TaskOverrides,
    pub task: BTreeMap<String, TaskOverrides>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        logging: LoggingSection,
        defaults: TaskOverrides,
        task: BTreeMap<String, TaskOverrides>,
    ) -> Self {
        Self {
            logging,
            defaults,
            task,
        }
    }

    /// Effective options for the task called `name`.
    ///
    /// Per-task values win over `[defaults]`, which win over the built-in
    /// defaults. Unknown names get the `[defaults]` options.
    pub fn options_for(&self, name: &str) -> TaskOptions {
        let mut options = TaskOptions::named(name);
        self.defaults.apply(&mut options);
        if let Some(overrides) = self.task.get(name) {
            overrides.apply(&mut options);
        }
        options
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    pub level: Option<LogLevel>,
}

/// Optional task settings, used both for `[defaults]` and `[task.<name>]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOverrides {
    pub style: Option<ExecutionStyle>,
    pub repeated_finish: Option<FinishPolicy>,
}

impl TaskOverrides {
    fn apply(&self, options: &mut TaskOptions) {
        if let Some(style) = self.style {
            options.style = style;
        }
        if let Some(policy) = self.repeated_finish {
            options.repeated_finish = policy;
        }
    }
}

/// Fixed, per-task settings handed to a task at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    /// Human-readable name used in logs and errors. Not required to be unique.
    pub name: String,
    pub style: ExecutionStyle,
    pub repeated_finish: FinishPolicy,
}

impl TaskOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: ExecutionStyle::default(),
            repeated_finish: FinishPolicy::default(),
        }
    }

    pub fn asynchronous(mut self) -> Self {
        self.style = ExecutionStyle::Asynchronous;
        self
    }

    pub fn style(mut self, style: ExecutionStyle) -> Self {
        self.style = style;
        self
    }

    pub fn repeated_finish(mut self, policy: FinishPolicy) -> Self {
        self.repeated_finish = policy;
        self
    }
}

impl Default for TaskOptions {
    fn default() -> Self {
        TaskOptions::named("task")
    }
}
