//! Synthetic demo dataset.
//!
//! Produces a deterministic (seeded) business-day series over the configured
//! bounds so the dashboard can run without a CSV export. Values are stored in
//! the same scaled units as the real file:
//!
//! - crude oil: USD per barrel × 100
//! - USD/PLN: plain rate
//! - fuel prices and predictions: PLN per litre × 1000

use chrono::{Datelike, Duration, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::data::dataset::{Record, TimeSeriesDataset};
use crate::domain::{DateBounds, FieldKey, PredictionQuery};
use crate::error::{AppError, EXIT_DATA};
use crate::models::{PredictionModels, PricePredictor};

/// Daily log-return volatility of the oil random walk.
const OIL_DAILY_VOL: f64 = 0.02;
/// Daily log-return volatility of the exchange-rate random walk.
const FX_DAILY_VOL: f64 = 0.005;
/// Pump-side noise around the model, in raw units (thousandths of PLN).
const PRICE_NOISE_RAW: f64 = 40.0;

const OIL_START_USD: f64 = 31.0;
const FX_START: f64 = 3.6;

pub fn generate_dataset(
    bounds: &DateBounds,
    models: &PredictionModels,
    seed: u64,
) -> Result<TimeSeriesDataset, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let oil_shock = normal(0.0, OIL_DAILY_VOL)?;
    let fx_shock = normal(0.0, FX_DAILY_VOL)?;
    let price_noise = normal(0.0, PRICE_NOISE_RAW)?;

    let mut oil = OIL_START_USD;
    let mut fx = FX_START;
    let mut records = Vec::new();
    let mut date = bounds.min;

    while date <= bounds.max {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            // Mild mean reversion keeps the walk inside the slider ranges.
            oil = (oil * (oil_shock.sample(&mut rng) - 0.0005 * (oil - 75.0) / 75.0).exp()).clamp(10.0, 150.0);
            fx = (fx * (fx_shock.sample(&mut rng) - 0.001 * (fx - 3.6) / 3.6).exp()).clamp(2.0, 5.0);

            let query = PredictionQuery {
                oil_price: oil,
                exchange_rate: fx,
            };
            let diesel_fit = models.diesel.predict_raw(&query);
            let super95_fit = models.super95.predict_raw(&query);

            let record = Record::new(date)
                .with(FieldKey::CrudeOil, (oil * 100.0).round())
                .with(FieldKey::UsdPln, (fx * 10_000.0).round() / 10_000.0)
                .with(FieldKey::Diesel, (diesel_fit + price_noise.sample(&mut rng)).round())
                .with(FieldKey::Super95, (super95_fit + price_noise.sample(&mut rng)).round())
                .with(FieldKey::DieselPrediction, diesel_fit.round())
                .with(FieldKey::Super95Prediction, super95_fit.round());
            records.push(record);
        }

        date = match date.checked_add_signed(Duration::days(1)) {
            Some(next) => next,
            None => break,
        };
    }

    debug!(rows = records.len(), seed, "generated demo dataset");
    TimeSeriesDataset::from_records(records)
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, std).map_err(|e| AppError::new(EXIT_DATA, format!("Invalid noise distribution: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn small_bounds() -> DateBounds {
        DateBounds::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn same_seed_same_data() {
        let models = PredictionModels::default();
        let a = generate_dataset(&small_bounds(), &models, 7).unwrap();
        let b = generate_dataset(&small_bounds(), &models, 7).unwrap();
        assert_eq!(a, b);
        let c = generate_dataset(&small_bounds(), &models, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn only_business_days_inside_bounds() {
        let bounds = small_bounds();
        let ds = generate_dataset(&bounds, &PredictionModels::default(), 1).unwrap();
        assert!(!ds.is_empty());
        for r in ds.records() {
            assert!(bounds.contains(r.date));
            assert!(!matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun));
            for key in FieldKey::ALL {
                assert!(r.get(key).is_some(), "{key:?} missing on {}", r.date);
            }
        }
    }

    #[test]
    fn stored_values_use_scaled_units() {
        let ds = generate_dataset(&small_bounds(), &PredictionModels::default(), 3).unwrap();
        let first = &ds.records()[0];
        let oil_raw = first.get(FieldKey::CrudeOil).unwrap();
        assert!((1_000.0..=15_000.0).contains(&oil_raw));
        let diesel_raw = first.get(FieldKey::Diesel).unwrap();
        assert!(diesel_raw > 500.0, "diesel stored in thousandths, got {diesel_raw}");
    }
}
