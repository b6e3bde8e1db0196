//! Tracing setup.
//!
//! Command-line runs log to stderr. The dashboard owns the terminal, so it logs
//! to a file when asked and discards logs otherwise.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, EXIT_INPUT};

/// Where log lines go.
#[derive(Debug, Clone, Copy)]
pub enum LogSink<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (tests, embedding).
pub fn init(filter: &str, sink: LogSink<'_>) -> Result<bool, AppError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid log filter '{filter}': {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    let installed = match sink {
        LogSink::Stderr => builder.with_writer(std::io::stderr).try_init().is_ok(),
        LogSink::File(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(EXIT_INPUT, format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        LogSink::Discard => builder.with_writer(std::io::sink).try_init().is_ok(),
    };
    Ok(installed)
}
