//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the range/projection code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::QueryOutput;
use crate::domain::{Advisory, FuelPrediction, PeriodToken, PredictionQuery, ViewMode};
use crate::fields::FieldRegistry;
use crate::project::Projection;

/// Header lines for a range query: requested period, resolved and final range.
pub fn format_range_summary(anchor: chrono::NaiveDate, period: PeriodToken, output: &QueryOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("Period: {} from {anchor}\n", period.display_name()));
    out.push_str(&format!(
        "Range: {}{}\n",
        output.resolved.interval,
        if output.resolved.clamped { " (clamped)" } else { "" }
    ));
    if output.interval != output.resolved.interval {
        out.push_str(&format!("Narrowed to: {}\n", output.interval));
    }
    out
}

/// One line per advisory, prefixed by its severity.
pub fn format_advisories(advisories: &[Advisory]) -> String {
    let mut out = String::new();
    for advisory in advisories {
        let tag = match advisory {
            Advisory::ClampedToMaximum { .. } => "note",
            Advisory::WidenRange | Advisory::IdenticalFields { .. } => "warning",
        };
        out.push_str(&format!("{tag}: {advisory}\n"));
    }
    out
}

/// Date column plus one column per series.
pub fn format_projection_table(projection: &Projection) -> String {
    let widths: Vec<usize> = projection
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let widest_value = projection
                .rows
                .iter()
                .map(|r| r.display[i].len())
                .max()
                .unwrap_or(0);
            column_title(&s.label).chars().count().max(widest_value).max(8)
        })
        .collect();

    let mut out = String::new();
    let mut header = format!("{:<10}", "date");
    let mut rule = "-".repeat(10);
    for (s, &w) in projection.series.iter().zip(&widths) {
        header.push_str(&format!("  {:>w$}", column_title(&s.label)));
        rule.push_str(&format!("  {}", "-".repeat(w)));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in &projection.rows {
        let mut line = row.date_label.clone();
        for (value, &w) in row.display.iter().zip(&widths) {
            line.push_str(&format!("  {value:>w$}"));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!("{} row(s)\n", projection.rows.len()));
    out
}

/// Series legend for a projection: `1. label (÷scale)`.
pub fn format_legend(projection: &Projection) -> String {
    let mut out = String::new();
    for (i, s) in projection.series.iter().enumerate() {
        out.push_str(&format!("{}. {} [{} ÷ {}]\n", i + 1, s.label, s.key.name(), s.scale));
    }
    out
}

pub fn format_prediction(query: &PredictionQuery, prediction: &FuelPrediction) -> String {
    format!(
        "Oil: {:.0} USD/bbl | USD/PLN: {:.2}\n\
         Diesel (Ekodiesel) wholesale net: {:.2} PLN/l\n\
         Eurosuper 95 wholesale net:       {:.2} PLN/l\n",
        query.oil_price, query.exchange_rate, prediction.diesel, prediction.super95
    )
}

/// Labels per view, with key and divisor.
pub fn format_field_list(registry: &FieldRegistry) -> String {
    let mut out = String::new();
    for mode in [ViewMode::Single, ViewMode::Comparison] {
        out.push_str(&format!("{} view:\n", mode.display_name()));
        for spec in registry.in_view(mode) {
            out.push_str(&format!(
                "  {:<56} {:<20} ÷{}\n",
                spec.label,
                spec.key.name(),
                spec.scale_for(mode)
            ));
        }
    }
    out
}

/// Short column title: the label up to its unit in parentheses.
fn column_title(label: &str) -> &str {
    label.split(" (").next().unwrap_or(label).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateInterval, FieldKey};
    use crate::project::{ProjectedRow, SeriesInfo};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn table_has_one_line_per_row() {
        let projection = Projection {
            mode: ViewMode::Single,
            interval: DateInterval::new(d(2020, 1, 1), d(2020, 1, 2)),
            series: vec![SeriesInfo {
                label: "Diesel (PLN/litre)".to_string(),
                key: FieldKey::Diesel,
                scale: 1000.0,
            }],
            rows: vec![
                ProjectedRow {
                    date: d(2020, 1, 1),
                    date_label: "2020-01-01".to_string(),
                    values: vec![Some(3.2)],
                    display: vec!["3.20".to_string()],
                },
                ProjectedRow {
                    date: d(2020, 1, 2),
                    date_label: "2020-01-02".to_string(),
                    values: vec![None],
                    display: vec!["-".to_string()],
                },
            ],
            advisories: vec![],
        };

        let expected = concat!(
            "date          Diesel\n",
            "----------  --------\n",
            "2020-01-01      3.20\n",
            "2020-01-02         -\n",
            "2 row(s)\n",
        );
        assert_eq!(format_projection_table(&projection), expected);
    }

    #[test]
    fn advisories_are_tagged() {
        let text = format_advisories(&[
            Advisory::ClampedToMaximum { max: d(2024, 12, 31) },
            Advisory::WidenRange,
        ]);
        assert_eq!(text, "note: data ends on 31 December 2024\nwarning: Widen the date range!\n");
    }

    #[test]
    fn prediction_uses_two_decimals() {
        let text = format_prediction(
            &PredictionQuery { oil_price: 80.0, exchange_rate: 4.1 },
            &FuelPrediction { diesel: 3.5, super95: 3.456 },
        );
        assert!(text.contains("3.50 PLN/l"));
        assert!(text.contains("3.46 PLN/l"));
        assert!(text.starts_with("Oil: 80 USD/bbl | USD/PLN: 4.10"));
    }

    #[test]
    fn field_list_covers_both_views() {
        let text = format_field_list(&FieldRegistry::default());
        assert!(text.starts_with("single view:\n"));
        assert!(text.contains("comparison view:\n"));
        assert!(text.contains("Crude oil price (USDx100 per barrel)"));
    }
}
