//! Run configuration derived from CLI flags, environment and `.env`.

use std::path::PathBuf;

use crate::cli::SourceArgs;
use crate::domain::DateBounds;
use crate::error::ConfigError;

/// Where the historical data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Csv(PathBuf),
    Demo { seed: u64 },
    /// Nothing configured: ask the user.
    Prompt { seed: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bounds: DateBounds,
    pub data: DataSource,
    pub models_path: Option<PathBuf>,
    pub fields_path: Option<PathBuf>,
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_args(args: &SourceArgs) -> Result<Self, ConfigError> {
        let bounds = DateBounds::new(args.min_date, args.max_date)?;
        let data = match (&args.data, args.demo) {
            (_, true) => DataSource::Demo { seed: args.seed },
            (Some(path), false) => DataSource::Csv(path.clone()),
            (None, false) => DataSource::Prompt { seed: args.seed },
        };
        Ok(Self {
            bounds,
            data,
            models_path: args.models.clone(),
            fields_path: args.fields.clone(),
            log_filter: args.log.clone(),
        })
    }
}
