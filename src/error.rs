//! Error types.
//!
//! `AppError` is what ends the process: it carries the exit code `main` returns.
//! The narrower errors below describe recoverable or startup-only failures and
//! convert into `AppError` when they have to stop the run.

use chrono::NaiveDate;
use thiserror::Error;

/// Exit code for bad input or configuration.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for unusable data.
pub const EXIT_DATA: u8 = 3;
/// Exit code for runtime failures (terminal, I/O while running).
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

/// The field label table is broken. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("field table exposes no labels for the {0} view")]
    EmptyView(&'static str),
    #[error("duplicate field label '{0}'")]
    DuplicateLabel(String),
    #[error("field label '{label}' has an invalid {which} scale ({value})")]
    InvalidScale {
        label: String,
        which: &'static str,
        value: f64,
    },
    #[error("field label '{0}' does not resolve to a dataset column")]
    Unresolved(String),
    #[error("date bounds are inverted: {min} is after {max}")]
    InvertedBounds { min: NaiveDate, max: NaiveDate },
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(EXIT_INPUT, format!("Configuration error: {err}"))
    }
}

/// A refinement that does not fit inside the resolved interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("{date} lies outside the selected range {start}..={end}")]
    OutsideResolved {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("range start {start} is after range end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

impl From<RangeError> for AppError {
    fn from(err: RangeError) -> Self {
        AppError::new(EXIT_INPUT, format!("Invalid date range: {err}"))
    }
}
