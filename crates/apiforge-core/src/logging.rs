use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, project_dirs};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "APIFORGE_LOG";

/// Install the global tracing subscriber.
///
/// The terminal is owned by the TUI, so logs go to `apiforge.log` in the data
/// directory instead of stderr.
pub fn init(config: &Config) -> Result<()> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let log_path = data_dir.join("apiforge.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file at {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))?;

    tracing::info!(path = %log_path.display(), "logging initialised");
    Ok(())
}

/// Build the filter: `APIFORGE_LOG` wins, then the configured level, then `info`.
fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
