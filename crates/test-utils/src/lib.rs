pub mod builders;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// How long [`with_timeout`] waits before declaring a task stuck.
pub const STUCK_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a per-test tracing subscriber once per test binary.
///
/// Output goes through the test writer, so it only shows for failing tests.
/// Filter with `RUST_LOG` (default `info`); transitions log at `debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`STUCK_TASK_TIMEOUT`].
///
/// Typically wraps `wait_finished()` to catch hooks that never finish.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(STUCK_TASK_TIMEOUT, f)
        .await
        .expect("task did not finish before the timeout")
}
