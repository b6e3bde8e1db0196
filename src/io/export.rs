//! Export projected rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one `date` column, then one column per series named by its field key, holding
//! the already-normalized values. Missing values are left empty.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{AppError, EXIT_RUNTIME};
use crate::project::Projection;

/// Write a projection to a CSV file.
pub fn write_projection_csv(path: &Path, projection: &Projection) -> Result<(), AppError> {
    let file = std::fs::File::create(path).map_err(|e| {
        AppError::new(EXIT_RUNTIME, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    write_projection(file, projection)?;
    info!(path = %path.display(), rows = projection.rows.len(), "projection exported");
    Ok(())
}

/// Write a projection as CSV to any writer.
pub fn write_projection<W: Write>(writer: W, projection: &Projection) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let err = |e: csv::Error| AppError::new(EXIT_RUNTIME, format!("Failed to write export CSV: {e}"));

    let mut header = vec!["date".to_string()];
    header.extend(projection.series.iter().map(|s| s.key.name().to_string()));
    wtr.write_record(&header).map_err(err)?;

    for row in &projection.rows {
        let mut record = vec![row.date.to_string()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        wtr.write_record(&record).map_err(err)?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateInterval, FieldKey, ViewMode};
    use crate::project::{ProjectedRow, SeriesInfo};
    use chrono::NaiveDate;

    #[test]
    fn export_writes_keys_and_blank_missing_values() {
        let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2021, 3, 2).unwrap();
        let projection = Projection {
            mode: ViewMode::Comparison,
            interval: DateInterval::new(day, next),
            series: vec![
                SeriesInfo {
                    label: "Ekodiesel".to_string(),
                    key: FieldKey::Diesel,
                    scale: 1000.0,
                },
                SeriesInfo {
                    label: "USD/PLN exchange rate".to_string(),
                    key: FieldKey::UsdPln,
                    scale: 1.0,
                },
            ],
            rows: vec![
                ProjectedRow {
                    date: day,
                    date_label: "2021-03-01".to_string(),
                    values: vec![Some(4.5), None],
                    display: vec!["4.50".to_string(), "-".to_string()],
                },
                ProjectedRow {
                    date: next,
                    date_label: "2021-03-02".to_string(),
                    values: vec![Some(4.25), Some(3.75)],
                    display: vec!["4.25".to_string(), "3.75".to_string()],
                },
            ],
            advisories: vec![],
        };

        let mut buf = Vec::new();
        write_projection(&mut buf, &projection).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,diesel,usd_pln\n2021-03-01,4.5000,\n2021-03-02,4.2500,3.7500\n"
        );
    }
}
