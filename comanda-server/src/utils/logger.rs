//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level when set. With a log directory
//! the output goes to a daily rolling file instead of stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// File prefix for rolling log files
const LOG_FILE_PREFIX: &str = "comanda-server";

/// Initialize the logger with stdout output
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// Returns `false` when a global subscriber was already installed
/// (tests install their own).
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, LOG_FILE_PREFIX);
            return subscriber
                .with_writer(file_appender)
                .with_ansi(false)
                .try_init()
                .is_ok();
        }
        eprintln!("Log directory {} does not exist, logging to stdout", dir);
    }

    subscriber.try_init().is_ok()
}
