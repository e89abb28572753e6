// src/config/mod.rs

//! TOML configuration for task options and logging.
//!
//! - [`model`] holds the serde types and the merged [`TaskOptions`].
//! - [`loader`] reads files or strings.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, LoggingSection, RawConfigFile, TaskOptions, TaskOverrides};
