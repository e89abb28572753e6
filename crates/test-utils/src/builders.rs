#![allow(dead_code)]

use std::collections::BTreeMap;
use taskstate::config::{ConfigFile, LoggingSection, RawConfigFile, TaskOverrides};
use taskstate::{ExecutionStyle, FinishPolicy, LogLevel};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                logging: LoggingSection::default(),
                defaults: TaskOverrides::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = Some(level);
        self
    }

    pub fn with_default_style(mut self, style: ExecutionStyle) -> Self {
        self.config.defaults.style = Some(style);
        self
    }

    pub fn with_default_repeated_finish(mut self, policy: FinishPolicy) -> Self {
        self.config.defaults.repeated_finish = Some(policy);
        self
    }

    pub fn with_task(mut self, name: &str, overrides: TaskOverrides) -> Self {
        self.config.task.insert(name.to_string(), overrides);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for per-task `TaskOverrides`.
pub struct TaskOverridesBuilder {
    overrides: TaskOverrides,
}

impl TaskOverridesBuilder {
    pub fn new() -> Self {
        Self {
            overrides: TaskOverrides::default(),
        }
    }

    pub fn style(mut self, style: ExecutionStyle) -> Self {
        self.overrides.style = Some(style);
        self
    }

    pub fn repeated_finish(mut self, policy: FinishPolicy) -> Self {
        self.overrides.repeated_finish = Some(policy);
        self
    }

    pub fn build(self) -> TaskOverrides {
        self.overrides
    }
}

impl Default for TaskOverridesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
