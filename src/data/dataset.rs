//! The historical dataset: ascending daily records of raw (scaled) values.
//!
//! Loaded once at startup and never mutated afterwards.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{DateInterval, FieldKey};
use crate::error::{AppError, EXIT_DATA, EXIT_INPUT};

/// Number of recognized columns.
pub const FIELD_COUNT: usize = FieldKey::ALL.len();

/// One dated row. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub values: [Option<f64>; FIELD_COUNT],
}

impl Record {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: [None; FIELD_COUNT],
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<f64> {
        self.values[key.index()]
    }

    pub fn set(&mut self, key: FieldKey, value: Option<f64>) {
        self.values[key.index()] = value;
    }

    pub fn with(mut self, key: FieldKey, value: f64) -> Self {
        self.set(key, Some(value));
        self
    }
}

/// Ascending, duplicate-free records.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesDataset {
    records: Vec<Record>,
    /// Keys the source provides a column for.
    columns: Vec<FieldKey>,
}

impl TimeSeriesDataset {
    /// Wrap records that are already sorted by date.
    ///
    /// Unsorted or duplicated dates are rejected rather than silently fixed.
    /// A key counts as a column when at least one record has a value for it.
    pub fn from_records(records: Vec<Record>) -> Result<Self, AppError> {
        let columns = FieldKey::ALL
            .into_iter()
            .filter(|&key| records.iter().any(|r| r.get(key).is_some()))
            .collect();
        Self::with_columns(records, columns)
    }

    fn with_columns(records: Vec<Record>, columns: Vec<FieldKey>) -> Result<Self, AppError> {
        for pair in records.windows(2) {
            let (prev, next) = (pair[0].date, pair[1].date);
            if next == prev {
                return Err(AppError::new(EXIT_DATA, format!("Duplicate date in dataset: {next}.")));
            }
            if next < prev {
                return Err(AppError::new(
                    EXIT_DATA,
                    format!("Dataset dates are not ascending: {next} follows {prev}."),
                ));
            }
        }
        Ok(Self { records, columns })
    }

    /// Load a `;`-separated CSV file.
    pub fn load_csv(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(EXIT_INPUT, format!("Failed to open dataset '{}': {e}", path.display()))
        })?;
        let dataset = Self::read_csv(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            first = ?dataset.first_date(),
            last = ?dataset.last_date(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV text: first column is the date, other columns are matched to
    /// field keys by header. Unknown columns are ignored.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read dataset headers: {e}")))?
            .clone();
        let columns = map_columns(&headers);
        if columns.is_empty() {
            return Err(AppError::new(
                EXIT_DATA,
                "Dataset has no recognized value columns (expected e.g. 'diesel', 'super95', 'crude_oil').",
            ));
        }

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let row = result
                .map_err(|e| AppError::new(EXIT_DATA, format!("CSV parse error on line {line}: {e}")))?;

            let raw_date = row.get(0).unwrap_or("");
            let date = parse_date(raw_date)
                .map_err(|msg| AppError::new(EXIT_DATA, format!("Line {line}: {msg}")))?;

            let mut record = Record::new(date);
            for &(col, key) in &columns {
                record.set(key, row.get(col).and_then(parse_value));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(AppError::new(EXIT_DATA, "Dataset contains no rows."));
        }

        Self::with_columns(records, columns.iter().map(|&(_, key)| key).collect())
    }

    /// Whether the source had a column for `key` (possibly all missing).
    pub fn has_column(&self, key: FieldKey) -> bool {
        self.columns.contains(&key)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records with `start <= date <= end`, in date order.
    pub fn slice(&self, interval: &DateInterval) -> &[Record] {
        let lo = self.records.partition_point(|r| r.date < interval.start);
        let hi = self.records.partition_point(|r| r.date <= interval.end);
        if lo >= hi {
            return &[];
        }
        &self.records[lo..hi]
    }
}

/// Column index -> key, skipping the date column and unknown headers.
fn map_columns(headers: &StringRecord) -> Vec<(usize, FieldKey)> {
    let mut out: Vec<(usize, FieldKey)> = Vec::new();
    for (idx, name) in headers.iter().enumerate().skip(1) {
        match FieldKey::from_column(name) {
            Some(key) if out.iter().any(|&(_, k)| k == key) => {
                warn!(column = name, key = key.name(), "duplicate column for field; keeping the first");
            }
            Some(key) => out.push((idx, key)),
            None => debug!(column = name, "ignoring unrecognized dataset column"),
        }
    }
    out
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    // Some exports carry a time part ("2004-01-02 00:00:00"); only the day matters.
    let day = raw.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("invalid date '{raw}': {e}"))
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed == "." {
        return None;
    }
    // Decimal commas show up in locale-formatted exports.
    let v = trimmed.replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const SAMPLE: &str = "data;ropa naftowa;USD/PLN;diesel;super95;diesel predykcja;super95 predykcja;notes\n\
2020-01-02;6600;3.79;4380;4410;4300;4350;x\n\
2020-01-03;6800;3.81;4400;4420;;nan;y\n\
2020-01-06;7000;3,82;4420;4440;4330;4370;z\n";

    #[test]
    fn reads_reference_headers_and_missing_markers() {
        let ds = TimeSeriesDataset::read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let second = &ds.records()[1];
        assert_eq!(second.date, d(2020, 1, 3));
        assert_eq!(second.get(FieldKey::CrudeOil), Some(6800.0));
        assert_eq!(second.get(FieldKey::DieselPrediction), None);
        assert_eq!(second.get(FieldKey::Super95Prediction), None);
        assert_eq!(ds.records()[2].get(FieldKey::UsdPln), Some(3.82));
    }

    #[test]
    fn slice_is_inclusive_on_both_ends() {
        let ds = TimeSeriesDataset::read_csv(SAMPLE.as_bytes()).unwrap();
        let all = ds.slice(&DateInterval::new(d(2020, 1, 2), d(2020, 1, 6)));
        assert_eq!(all.len(), 3);
        let inner = ds.slice(&DateInterval::new(d(2020, 1, 3), d(2020, 1, 5)));
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].date, d(2020, 1, 3));
        assert!(ds.slice(&DateInterval::new(d(2021, 1, 1), d(2021, 2, 1))).is_empty());
    }

    #[test]
    fn rejects_duplicate_and_unsorted_dates() {
        let dup = vec![Record::new(d(2020, 1, 1)), Record::new(d(2020, 1, 1))];
        assert!(TimeSeriesDataset::from_records(dup).is_err());
        let unsorted = vec![Record::new(d(2020, 1, 2)), Record::new(d(2020, 1, 1))];
        let err = TimeSeriesDataset::from_records(unsorted).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_DATA);
    }

    #[test]
    fn rejects_files_without_known_columns() {
        let text = "date;lpg\n2020-01-01;1\n";
        assert!(TimeSeriesDataset::read_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn header_columns_are_recorded_even_when_empty() {
        let text = "date;diesel;super95 predykcja\n2020-01-01;4000;\n";
        let ds = TimeSeriesDataset::read_csv(text.as_bytes()).unwrap();
        assert!(ds.has_column(FieldKey::Diesel));
        assert!(ds.has_column(FieldKey::Super95Prediction));
        assert!(!ds.has_column(FieldKey::CrudeOil));

        let built = TimeSeriesDataset::from_records(vec![Record::new(d(2020, 1, 1)).with(FieldKey::UsdPln, 3.9)]).unwrap();
        assert!(built.has_column(FieldKey::UsdPln));
        assert!(!built.has_column(FieldKey::Diesel));
    }

    #[test]
    fn accepts_timestamps_in_the_date_column() {
        let text = "date;diesel\n2020-01-01 00:00:00;4000\n";
        let ds = TimeSeriesDataset::read_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.first_date(), Some(d(2020, 1, 1)));
    }
}
