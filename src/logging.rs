//! Diagnostic logging.
//!
//! The terminal belongs to the TUI, so log lines only go to a file, and only
//! when one is requested with `--log-file`. The filter comes from
//! `PASSDECK_LOG` (same syntax as `RUST_LOG`) and defaults to `info`.
//!
//! Secrets never reach the log: output text is not logged, only actions,
//! executables and exit statuses.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PASSDECK_LOG";

/// Build the filter from `PASSDECK_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Send log output to `path`, appending to it.
pub fn init_file_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}
