//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between the resolver, the projector and the front-ends
//! - read from the field/model configuration files
//! - printed in reports without extra adapters

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One column of the historical dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CrudeOil,
    UsdPln,
    Diesel,
    Super95,
    DieselPrediction,
    Super95Prediction,
}

impl FieldKey {
    pub const ALL: [FieldKey; 6] = [
        FieldKey::CrudeOil,
        FieldKey::UsdPln,
        FieldKey::Diesel,
        FieldKey::Super95,
        FieldKey::DieselPrediction,
        FieldKey::Super95Prediction,
    ];

    /// Position of this key inside a record's value array.
    pub fn index(self) -> usize {
        match self {
            FieldKey::CrudeOil => 0,
            FieldKey::UsdPln => 1,
            FieldKey::Diesel => 2,
            FieldKey::Super95 => 3,
            FieldKey::DieselPrediction => 4,
            FieldKey::Super95Prediction => 5,
        }
    }

    /// Canonical key name (also the canonical CSV column header).
    pub fn name(self) -> &'static str {
        match self {
            FieldKey::CrudeOil => "crude_oil",
            FieldKey::UsdPln => "usd_pln",
            FieldKey::Diesel => "diesel",
            FieldKey::Super95 => "super95",
            FieldKey::DieselPrediction => "diesel_prediction",
            FieldKey::Super95Prediction => "super95_prediction",
        }
    }

    /// Other column headers accepted for this key.
    ///
    /// The reference export uses Polish headers, so both spellings are read.
    pub fn column_aliases(self) -> &'static [&'static str] {
        match self {
            FieldKey::CrudeOil => &["ropa naftowa", "crude oil", "oil"],
            FieldKey::UsdPln => &["USD/PLN", "usd/pln", "exchange_rate"],
            FieldKey::Diesel => &[],
            FieldKey::Super95 => &[],
            FieldKey::DieselPrediction => &["diesel predykcja", "diesel prediction"],
            FieldKey::Super95Prediction => &["super95 predykcja", "super95 prediction"],
        }
    }

    /// Match a CSV header (case-insensitive, trimmed, BOM-stripped) to a key.
    pub fn from_column(header: &str) -> Option<FieldKey> {
        let header = header.trim().trim_start_matches('\u{feff}');
        FieldKey::ALL.into_iter().find(|key| {
            key.name().eq_ignore_ascii_case(header)
                || key
                    .column_aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(header))
        })
    }
}

/// Relative length of a date range, measured from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PeriodToken {
    Week,
    Month,
    Quarter,
    Year,
    #[value(name = "five-years", alias = "5y")]
    FiveYears,
    #[value(alias = "max")]
    Maximum,
}

impl PeriodToken {
    pub const ALL: [PeriodToken; 6] = [
        PeriodToken::Week,
        PeriodToken::Month,
        PeriodToken::Quarter,
        PeriodToken::Year,
        PeriodToken::FiveYears,
        PeriodToken::Maximum,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            PeriodToken::Week => "week",
            PeriodToken::Month => "month",
            PeriodToken::Quarter => "quarter",
            PeriodToken::Year => "year",
            PeriodToken::FiveYears => "5 years",
            PeriodToken::Maximum => "maximum",
        }
    }

    pub fn next(self) -> Self {
        let idx = PeriodToken::ALL.iter().position(|&p| p == self).unwrap_or(0);
        PeriodToken::ALL[(idx + 1) % PeriodToken::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = PeriodToken::ALL.iter().position(|&p| p == self).unwrap_or(0);
        PeriodToken::ALL[(idx + PeriodToken::ALL.len() - 1) % PeriodToken::ALL.len()]
    }
}

/// Which projection a label list or scale applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One series on its own.
    Single,
    /// Two series overlaid on one chart.
    Comparison,
}

impl ViewMode {
    pub fn display_name(self) -> &'static str {
        match self {
            ViewMode::Single => "single",
            ViewMode::Comparison => "comparison",
        }
    }
}

/// Configured date bounds of the dataset.
///
/// These are configuration values: if the loaded file ends earlier or later,
/// clamping still targets `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    /// Pull a date into `[min, max]`.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

impl Default for DateBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_DATE,
            max: DEFAULT_MAX_DATE,
        }
    }
}

pub const DEFAULT_MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2004, 1, 1) {
    Some(d) => d,
    None => NaiveDate::MIN,
};

pub const DEFAULT_MAX_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 12, 31) {
    Some(d) => d,
    None => NaiveDate::MAX,
};

/// Inclusive calendar-date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateInterval {
    /// Build an interval, ordering the two ends.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Start equals end: nothing meaningful to chart.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days from start to end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Output of the resolver: the interval plus whether it was clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub interval: DateInterval,
    pub clamped: bool,
}

/// Conditions the presentation layer should tell the user about.
///
/// None of these are failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    /// The requested period ran past the configured end of the data.
    ClampedToMaximum { max: NaiveDate },
    /// Start equals end; ask for a wider range instead of charting.
    WidenRange,
    /// Both comparison slots hold the same label.
    IdenticalFields { label: String },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::ClampedToMaximum { max } => {
                write!(f, "data ends on {}", max.format("%-d %B %Y"))
            }
            Advisory::WidenRange => write!(f, "Widen the date range!"),
            Advisory::IdenticalFields { label } => {
                write!(f, "Pick two different parameters (both are '{label}').")
            }
        }
    }
}

/// Slider inputs for the price predictors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionQuery {
    /// Crude oil price, USD per barrel.
    pub oil_price: f64,
    /// USD/PLN exchange rate.
    pub exchange_rate: f64,
}

pub const OIL_PRICE_MIN: f64 = 0.0;
pub const OIL_PRICE_MAX: f64 = 150.0;
pub const OIL_PRICE_STEP: f64 = 1.0;
pub const EXCHANGE_RATE_MIN: f64 = 1.5;
pub const EXCHANGE_RATE_MAX: f64 = 5.0;
pub const EXCHANGE_RATE_STEP: f64 = 0.01;

impl PredictionQuery {
    /// Keep both inputs on the slider ranges.
    pub fn clamped(self) -> Self {
        Self {
            oil_price: self.oil_price.clamp(OIL_PRICE_MIN, OIL_PRICE_MAX),
            exchange_rate: self.exchange_rate.clamp(EXCHANGE_RATE_MIN, EXCHANGE_RATE_MAX),
        }
    }
}

impl Default for PredictionQuery {
    fn default() -> Self {
        Self {
            oil_price: 75.0,
            exchange_rate: 4.0,
        }
    }
}

/// Normalized model output, PLN per litre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelPrediction {
    pub diesel: f64,
    pub super95: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_aliases_cover_reference_headers() {
        assert_eq!(FieldKey::from_column("ropa naftowa"), Some(FieldKey::CrudeOil));
        assert_eq!(FieldKey::from_column(" USD/PLN "), Some(FieldKey::UsdPln));
        assert_eq!(FieldKey::from_column("\u{feff}Diesel"), Some(FieldKey::Diesel));
        assert_eq!(
            FieldKey::from_column("super95 predykcja"),
            Some(FieldKey::Super95Prediction)
        );
        assert_eq!(FieldKey::from_column("lpg"), None);
    }

    #[test]
    fn field_indices_are_dense() {
        let mut seen: Vec<usize> = FieldKey::ALL.iter().map(|k| k.index()).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn period_cycles_in_both_directions() {
        assert_eq!(PeriodToken::Maximum.next(), PeriodToken::Week);
        assert_eq!(PeriodToken::Week.prev(), PeriodToken::Maximum);
        assert_eq!(PeriodToken::Month.next().prev(), PeriodToken::Month);
    }

    #[test]
    fn bounds_reject_inverted_dates() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(DateBounds::new(a, b).is_err());
        assert_eq!(DateBounds::default().max, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn clamped_advisory_mentions_end_date() {
        let max = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(
            Advisory::ClampedToMaximum { max }.to_string(),
            "data ends on 31 December 2024"
        );
    }

    #[test]
    fn prediction_query_clamps_to_slider_range() {
        let q = PredictionQuery {
            oil_price: 300.0,
            exchange_rate: 0.5,
        }
        .clamped();
        assert_eq!(q.oil_price, OIL_PRICE_MAX);
        assert_eq!(q.exchange_rate, EXCHANGE_RATE_MIN);
    }
}
