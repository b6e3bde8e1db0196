//! Process-lifetime state: built once at startup, read-only afterwards.

use tracing::info;

use crate::cli::picker::{prompt_for_dataset, DatasetChoice};
use crate::config::{AppConfig, DataSource};
use crate::data::{generate_dataset, TimeSeriesDataset};
use crate::domain::DateBounds;
use crate::error::AppError;
use crate::fields::FieldRegistry;
use crate::models::PredictionModels;

/// Everything the views need, passed by reference.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub bounds: DateBounds,
    pub dataset: TimeSeriesDataset,
    pub registry: FieldRegistry,
    pub models: PredictionModels,
}

impl AppContext {
    /// Assemble a context from parts.
    ///
    /// The field table is checked here, including that every offered label
    /// has a column in `dataset`.
    pub fn new(
        bounds: DateBounds,
        dataset: TimeSeriesDataset,
        registry: FieldRegistry,
        models: PredictionModels,
    ) -> Result<Self, AppError> {
        registry.self_check()?;
        registry.check_columns(|key| dataset.has_column(key))?;
        Ok(Self {
            bounds,
            dataset,
            registry,
            models,
        })
    }

    /// Load the field table, the models and the dataset named by `config`.
    pub fn load(config: &AppConfig) -> Result<Self, AppError> {
        let registry = load_registry(config)?;
        let models = load_models(config)?;

        let dataset = match &config.data {
            DataSource::Csv(path) => TimeSeriesDataset::load_csv(path)?,
            DataSource::Demo { seed } => generate_dataset(&config.bounds, &models, *seed)?,
            DataSource::Prompt { seed } => match prompt_for_dataset()? {
                DatasetChoice::File(path) => TimeSeriesDataset::load_csv(&path)?,
                DatasetChoice::Demo => generate_dataset(&config.bounds, &models, *seed)?,
            },
        };

        if let Some(last) = dataset.last_date().filter(|&d| d != config.bounds.max) {
            info!(%last, max = %config.bounds.max, "dataset end differs from the configured maximum");
        }

        Self::new(config.bounds, dataset, registry, models)
    }
}

/// The configured field table, or the built-in one.
pub fn load_registry(config: &AppConfig) -> Result<FieldRegistry, AppError> {
    let registry = match &config.fields_path {
        Some(path) => FieldRegistry::from_json_file(path)?,
        None => FieldRegistry::default(),
    };
    registry.self_check()?;
    Ok(registry)
}

/// The configured prediction models, or the built-in coefficients.
pub fn load_models(config: &AppConfig) -> Result<PredictionModels, AppError> {
    match &config.models_path {
        Some(path) => PredictionModels::from_json_file(path),
        None => Ok(PredictionModels::default()),
    }
}
