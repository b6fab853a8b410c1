//! Subscriber setup for applications embedding the crate.
//!
//! The library itself only emits `tracing` events. Level is controlled by
//! `RUST_LOG`; the `default_filter` applies when it is unset. Both
//! initializers leave an already-installed global subscriber in place.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::GcodeError;

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs a formatted subscriber writing to stderr. Returns `false` when a
/// global subscriber was already set.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Installs a subscriber appending to `dir/file_name` through a
/// non-blocking writer, creating `dir` if needed.
///
/// Keep the returned guard alive for as long as events should be flushed.
pub fn init_file(dir: &Path, file_name: &str) -> Result<WorkerGuard, GcodeError> {
    // rolling::never panics if it cannot open the file
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path = %dir.join(file_name).display(), "gcody logging started");
    }

    Ok(guard)
}
