//! Price predictors for diesel and Eurosuper 95.
//!
//! Predictors are opaque pure functions from `(oil price, exchange rate)` to a
//! raw price in the dataset's stored unit (thousandths of a złoty per litre).
//! The shipped implementation is a linear model with an interaction term whose
//! coefficients come from a JSON file.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{FuelPrediction, PredictionQuery};
use crate::error::{AppError, EXIT_INPUT};

/// Divisor turning raw predictions into PLN per litre.
pub const PREDICTION_SCALE: f64 = 1000.0;

pub trait PricePredictor {
    /// Raw prediction in the stored (scaled) unit.
    fn predict_raw(&self, query: &PredictionQuery) -> f64;
}

/// `intercept + oil·a + rate·b + oil·rate·c`, all in raw units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPriceModel {
    pub intercept: f64,
    #[serde(default)]
    pub oil: f64,
    #[serde(default)]
    pub exchange_rate: f64,
    #[serde(default)]
    pub oil_exchange_rate: f64,
}

impl PricePredictor for LinearPriceModel {
    fn predict_raw(&self, query: &PredictionQuery) -> f64 {
        self.intercept
            + self.oil * query.oil_price
            + self.exchange_rate * query.exchange_rate
            + self.oil_exchange_rate * query.oil_price * query.exchange_rate
    }
}

/// The two predictors, loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionModels {
    pub diesel: LinearPriceModel,
    pub super95: LinearPriceModel,
}

impl PredictionModels {
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(EXIT_INPUT, format!("Failed to open model file '{}': {e}", path.display()))
        })?;
        let models: PredictionModels = serde_json::from_reader(file).map_err(|e| {
            AppError::new(EXIT_INPUT, format!("Invalid model file '{}': {e}", path.display()))
        })?;
        info!(path = %path.display(), "prediction models loaded");
        Ok(models)
    }

    /// Predict both fuels, normalized to PLN per litre and rounded to 0.01.
    pub fn predict(&self, query: &PredictionQuery) -> FuelPrediction {
        predict_fuel(&self.diesel, &self.super95, query)
    }
}

impl Default for PredictionModels {
    /// Coefficients roughly matching the 2004-2024 relationship; used when no
    /// model file is configured.
    fn default() -> Self {
        Self {
            diesel: LinearPriceModel {
                intercept: 900.0,
                oil: 0.0,
                exchange_rate: 0.0,
                oil_exchange_rate: 7.8,
            },
            super95: LinearPriceModel {
                intercept: 1000.0,
                oil: 0.0,
                exchange_rate: 0.0,
                oil_exchange_rate: 7.2,
            },
        }
    }
}

pub fn predict_fuel(
    diesel: &impl PricePredictor,
    super95: &impl PricePredictor,
    query: &PredictionQuery,
) -> FuelPrediction {
    FuelPrediction {
        diesel: normalize_prediction(diesel.predict_raw(query)),
        super95: normalize_prediction(super95.predict_raw(query)),
    }
}

/// Raw -> PLN per litre, rounded to two decimals.
pub fn normalize_prediction(raw: f64) -> f64 {
    (raw / PREDICTION_SCALE * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_models_predict_plausible_prices() {
        let p = PredictionModels::default().predict(&PredictionQuery::default());
        assert_relative_eq!(p.diesel, 3.24);
        assert_relative_eq!(p.super95, 3.16);
    }

    #[test]
    fn normalization_rounds_to_cents() {
        assert_relative_eq!(normalize_prediction(4567.8), 4.57);
        assert_relative_eq!(normalize_prediction(4564.9), 4.56);
        assert_relative_eq!(normalize_prediction(0.0), 0.0);
    }

    #[test]
    fn any_predictor_plugs_in() {
        struct Fixed(f64);
        impl PricePredictor for Fixed {
            fn predict_raw(&self, _: &PredictionQuery) -> f64 {
                self.0
            }
        }
        let p = predict_fuel(&Fixed(5120.0), &Fixed(4999.0), &PredictionQuery::default());
        assert_relative_eq!(p.diesel, 5.12);
        assert_relative_eq!(p.super95, 5.0);
    }

    #[test]
    fn model_json_fills_missing_coefficients_with_zero() {
        let models: PredictionModels = serde_json::from_str(
            r#"{ "diesel": { "intercept": 1000, "oil": 20 }, "super95": { "intercept": 2000 } }"#,
        )
        .unwrap();
        let q = PredictionQuery { oil_price: 100.0, exchange_rate: 4.0 };
        let p = models.predict(&q);
        assert_relative_eq!(p.diesel, 3.0);
        assert_relative_eq!(p.super95, 2.0);
    }
}
