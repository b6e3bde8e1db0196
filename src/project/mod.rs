//! Interval + field selection -> display-ready rows.
//!
//! The projector slices the dataset to an inclusive date interval, divides raw
//! values by the view's scale and formats them for tables, while keeping the
//! numbers for charts. A degenerate interval is never projected.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::data::TimeSeriesDataset;
use crate::domain::{Advisory, DateInterval, FieldKey, ViewMode};
use crate::fields::FieldSpec;

/// Table placeholder for a missing value.
pub const MISSING: &str = "-";

/// One projected column.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInfo {
    pub label: String,
    pub key: FieldKey,
    /// Divisor that was applied to the raw values.
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedRow {
    pub date: NaiveDate,
    /// ISO 8601 calendar date.
    pub date_label: String,
    /// Normalized values, one per series.
    pub values: Vec<Option<f64>>,
    /// `values` with two decimals, `-` when missing.
    pub display: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub mode: ViewMode,
    pub interval: DateInterval,
    pub series: Vec<SeriesInfo>,
    pub rows: Vec<ProjectedRow>,
    pub advisories: Vec<Advisory>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Chart points for one series: x is days since the interval start.
    pub fn points(&self, series: usize) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| {
                let y = row.values.get(series).copied().flatten()?;
                let x = (row.date - self.interval.start).num_days() as f64;
                Some((x, y))
            })
            .collect()
    }

    /// Min/max over every present value of every series.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|row| row.values.iter().flatten().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Result of a projection request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionOutcome {
    Ready(Projection),
    /// Start equals end; the caller should ask for a wider range.
    WidenRange,
}

impl ProjectionOutcome {
    pub fn projection(&self) -> Option<&Projection> {
        match self {
            ProjectionOutcome::Ready(p) => Some(p),
            ProjectionOutcome::WidenRange => None,
        }
    }

    pub fn advisories(&self) -> Vec<Advisory> {
        match self {
            ProjectionOutcome::Ready(p) => p.advisories.clone(),
            ProjectionOutcome::WidenRange => vec![Advisory::WidenRange],
        }
    }
}

/// Read-only view over the dataset.
#[derive(Debug, Clone, Copy)]
pub struct SeriesProjector<'a> {
    dataset: &'a TimeSeriesDataset,
}

impl<'a> SeriesProjector<'a> {
    pub fn new(dataset: &'a TimeSeriesDataset) -> Self {
        Self { dataset }
    }

    /// Single-series projection, using each field's base scale.
    pub fn single(&self, field: &FieldSpec, interval: DateInterval) -> ProjectionOutcome {
        self.project(ViewMode::Single, &[field], interval)
    }

    /// Two-series projection, using each field's comparison scale.
    ///
    /// Identical selections are still projected; the projection carries an
    /// advisory so the caller can warn.
    pub fn compare(&self, first: &FieldSpec, second: &FieldSpec, interval: DateInterval) -> ProjectionOutcome {
        self.project(ViewMode::Comparison, &[first, second], interval)
    }

    fn project(&self, mode: ViewMode, fields: &[&FieldSpec], interval: DateInterval) -> ProjectionOutcome {
        if interval.is_degenerate() {
            debug!(%interval, "degenerate interval; nothing to project");
            return ProjectionOutcome::WidenRange;
        }

        let series: Vec<SeriesInfo> = fields
            .iter()
            .map(|f| SeriesInfo {
                label: f.label.clone(),
                key: f.key,
                scale: f.scale_for(mode),
            })
            .collect();

        let rows = self
            .dataset
            .slice(&interval)
            .iter()
            .map(|record| {
                let values: Vec<Option<f64>> = series
                    .iter()
                    .map(|s| record.get(s.key).map(|raw| raw / s.scale))
                    .collect();
                ProjectedRow {
                    date: record.date,
                    date_label: record.date.format("%Y-%m-%d").to_string(),
                    display: values.iter().map(|v| format_value(*v)).collect(),
                    values,
                }
            })
            .collect::<Vec<_>>();

        let mut advisories = Vec::new();
        if let [first, second] = fields {
            if first.label == second.label {
                warn!(label = %first.label, "comparing a field with itself");
                advisories.push(Advisory::IdenticalFields {
                    label: first.label.clone(),
                });
            }
        }

        debug!(mode = mode.display_name(), %interval, rows = rows.len(), "projected series");
        ProjectionOutcome::Ready(Projection {
            mode,
            interval,
            series,
            rows,
            advisories,
        })
    }
}

/// Two decimals, or the missing marker.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::fields::FieldRegistry;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Daily records from 2019-12-25 to 2020-02-10 with constant raw values.
    fn daily_dataset() -> TimeSeriesDataset {
        let mut records = Vec::new();
        let mut date = d(2019, 12, 25);
        while date <= d(2020, 2, 10) {
            records.push(
                Record::new(date)
                    .with(FieldKey::Diesel, 3200.0)
                    .with(FieldKey::Super95, 3500.0)
                    .with(FieldKey::CrudeOil, 7500.0)
                    .with(FieldKey::UsdPln, 3.8),
            );
            date += Duration::days(1);
        }
        TimeSeriesDataset::from_records(records).unwrap()
    }

    #[test]
    fn diesel_over_january_is_normalized_and_ordered() {
        let ds = daily_dataset();
        let registry = FieldRegistry::default();
        let diesel = registry.resolve_for(ViewMode::Single, "diesel").unwrap();
        let interval = DateInterval::new(d(2020, 1, 1), d(2020, 1, 31));

        let outcome = SeriesProjector::new(&ds).single(diesel, interval);
        let p = outcome.projection().unwrap();
        assert_eq!(p.rows.len(), 31);
        assert!(p.rows.iter().all(|r| r.display == vec!["3.20".to_string()]));
        assert!(p.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(p.rows[0].date_label, "2020-01-01");
        assert_eq!(p.rows[30].date_label, "2020-01-31");
        assert!(p.advisories.is_empty());
    }

    #[test]
    fn oil_differs_by_exactly_100_between_modes() {
        let ds = daily_dataset();
        let registry = FieldRegistry::default();
        let interval = DateInterval::new(d(2020, 1, 1), d(2020, 1, 7));
        let projector = SeriesProjector::new(&ds);

        let single_oil = registry.resolve("Crude oil price (USD per barrel)").unwrap();
        let cmp_oil = registry.resolve("Crude oil price (USDx100 per barrel)").unwrap();
        let fx = registry.resolve("USD/PLN exchange rate").unwrap();

        let single = projector.single(single_oil, interval);
        let cmp = projector.compare(cmp_oil, fx, interval);
        let single_v = single.projection().unwrap().rows[0].values[0].unwrap();
        let cmp_row = &cmp.projection().unwrap().rows[0];

        assert_relative_eq!(single_v, 7500.0);
        assert_relative_eq!(cmp_row.values[0].unwrap(), 75.0);
        assert_eq!(cmp_row.display[0], "75.00");
        assert_relative_eq!(single_v / cmp_row.values[0].unwrap(), 100.0);
        assert_eq!(cmp_row.display[1], "3.80");
    }

    #[test]
    fn degenerate_interval_asks_to_widen() {
        let ds = daily_dataset();
        let registry = FieldRegistry::default();
        let diesel = registry.resolve_for(ViewMode::Single, "diesel").unwrap();
        let one_day = DateInterval::new(d(2020, 1, 5), d(2020, 1, 5));
        let outcome = SeriesProjector::new(&ds).single(diesel, one_day);
        assert_eq!(outcome, ProjectionOutcome::WidenRange);
        assert_eq!(outcome.advisories(), vec![Advisory::WidenRange]);
    }

    #[test]
    fn identical_comparison_still_projects_with_advisory() {
        let ds = daily_dataset();
        let registry = FieldRegistry::default();
        let diesel = registry.resolve_for(ViewMode::Comparison, "diesel").unwrap();
        let interval = DateInterval::new(d(2020, 1, 1), d(2020, 1, 3));
        let outcome = SeriesProjector::new(&ds).compare(diesel, diesel, interval);
        let p = outcome.projection().unwrap();
        assert_eq!(p.rows.len(), 3);
        assert!(matches!(p.advisories[0], Advisory::IdenticalFields { .. }));
    }

    #[test]
    fn missing_values_are_marked_and_skipped_in_points() {
        let records = vec![
            Record::new(d(2020, 1, 1)).with(FieldKey::Diesel, 4000.0),
            Record::new(d(2020, 1, 2)),
            Record::new(d(2020, 1, 3)).with(FieldKey::Diesel, 4100.0),
        ];
        let ds = TimeSeriesDataset::from_records(records).unwrap();
        let registry = FieldRegistry::default();
        let diesel = registry.resolve_for(ViewMode::Single, "diesel").unwrap();
        let outcome = SeriesProjector::new(&ds).single(diesel, DateInterval::new(d(2020, 1, 1), d(2020, 1, 3)));
        let p = outcome.projection().unwrap();
        assert_eq!(p.rows[1].display[0], MISSING);
        assert_eq!(p.points(0), vec![(0.0, 4.0), (2.0, 4.1)]);
        assert_eq!(p.value_bounds(), Some((4.0, 4.1)));
    }

    #[test]
    fn projecting_twice_gives_the_same_rows() {
        let ds = daily_dataset();
        let registry = FieldRegistry::default();
        let super95 = registry.resolve_for(ViewMode::Single, "super95").unwrap();
        let interval = DateInterval::new(d(2020, 1, 20), d(2020, 2, 20));
        let projector = SeriesProjector::new(&ds);
        let a = projector.single(super95, interval);
        let b = projector.single(super95, interval);
        assert_eq!(a, b);
        assert_eq!(a.projection().unwrap().rows.len(), 22);
    }
}
