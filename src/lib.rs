// src/lib.rs

//! Thread-safe, observable task state machine.
//!
//! A task moves `Ready -> Executing -> Finished` exactly once. Any number of
//! threads may read its predicates while one writer at a time performs a
//! transition; every transition is bracketed by before/after notifications to
//! registered observers. Cancellation is checked when the task is started.
//!
//! ```
//! use taskstate::{Completion, Operation, TaskOptions};
//!
//! let upstream = Operation::new(TaskOptions::named("upstream"), |_: Completion| {});
//! let downstream = Operation::new(TaskOptions::named("downstream"), |done: Completion| {
//!     done.finish().unwrap();
//! });
//! downstream.add_dependency(&upstream.handle()).unwrap();
//!
//! assert!(!downstream.is_ready());
//! upstream.start().unwrap();
//! assert!(downstream.is_ready());
//! downstream.start().unwrap();
//! assert!(downstream.is_finished());
//! ```
//!
//! Scheduling, thread pools and cycle detection are left to the caller.

pub mod config;
pub mod errors;
pub mod logging;
pub mod state;
pub mod task;
pub mod types;

pub use config::{ConfigFile, TaskOptions};
pub use errors::{Result, TaskError};
pub use state::{Announce, ObserverId, TaskCore, TaskId, Transition, TransitionObserver};
pub use task::{Completion, Execute, Operation, TaskHandle};
pub use types::{ExecutionStyle, FinishPolicy, LogLevel, TaskState};

/// Build an [`Operation`] whose options come from `[defaults]` and
/// `[task.<name>]` of a loaded config.
pub fn operation_from_config<E: Execute>(cfg: &ConfigFile, name: &str, hook: E) -> Operation<E> {
    Operation::new(cfg.options_for(name), hook)
}

/// Install the global log subscriber using `[logging].level`, falling back
/// to the environment.
pub fn init_logging_from_config(cfg: &ConfigFile) -> anyhow::Result<()> {
    logging::init_logging(cfg.logging.level)
}
