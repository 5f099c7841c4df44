use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Set to a path to additionally write DEBUG logs to that file
pub const LOG_FILE_ENV: &str = "RADIO_LOG_FILE";

/// Install the global subscriber: stderr filtered by `RUST_LOG` (default
/// `warn`), plus an optional debug file layer.
pub fn init_tracing() -> Result<()> {
    let file_logging = std::env::var(LOG_FILE_ENV).ok();

    let stderr_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    if let Some(log_path) = file_logging {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path))?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(LevelFilter::DEBUG);

        registry
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        tracing::debug!("File logging enabled: {}", log_path);
    } else {
        registry
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    Ok(())
}
