// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.logging, raw.defaults, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_task_names(cfg)?;
    Ok(())
}

fn validate_task_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.task.keys() {
        if name.trim().is_empty() {
            return Err(TaskError::ConfigError(
                "[task.<name>] sections must have a non-empty name".to_string(),
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(TaskError::ConfigError(format!(
                "task name '{}' must not contain whitespace",
                name
            )));
        }
    }
    Ok(())
}
