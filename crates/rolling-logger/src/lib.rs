//! Rolling Logger
//!
//! A `tracing-subscriber` setup that writes every event to stdout and to a
//! size-rotated log file, and keeps the most recent lines in an in-memory
//! circular buffer so they can be served back (e.g. for diagnostics).
//!
//! The `log` facade is bridged into tracing, so `log::info!` and
//! `tracing::info!` end up in the same sinks.

mod buffer;
mod file;

use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use buffer::LineBuffer;
pub use file::RollingFile;

/// Tunables for [`init_logger_with`]
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Rotate the active file once it would grow past this many bytes
    pub max_file_size: u64,
    /// Number of rotated files kept next to the active one
    pub max_files: usize,
    /// Lines retained in the in-memory buffer
    pub buffer_lines: usize,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
            default_filter: "info".to_string(),
        }
    }
}

static RECENT: OnceLock<Arc<Mutex<LineBuffer>>> = OnceLock::new();

/// Initialize logging into `log_dir/<app_name>.log` with default settings
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerConfig::default())
}

/// Initialize logging with explicit settings
///
/// Fails if the directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: LoggerConfig,
) -> Result<(), String> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let recent = RECENT
        .get_or_init(|| Arc::new(Mutex::new(LineBuffer::new(config.buffer_lines))))
        .clone();

    let file = RollingFile::open(log_dir, app_name, config.max_file_size, config.max_files)
        .map_err(|e| format!("Failed to open log file: {}", e))?;
    let writer = file::SharedWriter::new(file, recent);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        )
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    Ok(())
}

/// Snapshot of the most recent log lines, oldest first
///
/// Empty until [`init_logger`] has run.
pub fn recent_lines() -> Vec<String> {
    match RECENT.get() {
        Some(buffer) => match buffer.lock() {
            Ok(guard) => guard.lines(),
            Err(poisoned) => poisoned.into_inner().lines(),
        },
        None => Vec::new(),
    }
}

/// Log an informational message through the `log` facade
pub fn info(msg: &str) -> Result<(), String> {
    log::info!("{}", msg);
    Ok(())
}

/// Log an error message through the `log` facade
pub fn error(msg: &str) -> Result<(), String> {
    log::error!("{}", msg);
    Ok(())
}
