//! End-to-end checks through the public library API: dataset in, rows out.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use fuel_dash::app::pipeline::{run_query, FieldSelection};
use fuel_dash::app::AppContext;
use fuel_dash::data::{generate_dataset, TimeSeriesDataset};
use fuel_dash::domain::{Advisory, DateBounds, PeriodToken, PredictionQuery, ViewMode};
use fuel_dash::fields::FieldRegistry;
use fuel_dash::models::PredictionModels;
use fuel_dash::range::RangeSelection;
use fuel_dash::report::format_projection_table;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const EXPORT: &str = "\
data;ropa naftowa;USD/PLN;diesel;super95;diesel predykcja;super95 predykcja;komentarz
2024-01-02;7712;3,95;5120;5301;5090;5280;x
2024-01-03;;3,97;5150;5330;5110;5300;
2024-01-04 00:00:00;7805;3,99;nan;5360;5130;5320;y
";

fn csv_context() -> AppContext {
    let bounds = DateBounds::new(d(2024, 1, 1), d(2024, 1, 4)).unwrap();
    let dataset = TimeSeriesDataset::read_csv(EXPORT.as_bytes()).unwrap();
    AppContext::new(bounds, dataset, FieldRegistry::default(), PredictionModels::default()).unwrap()
}

#[test]
fn csv_export_projects_with_view_scales() {
    let ctx = csv_context();
    let mut selection = RangeSelection::new(&ctx.bounds);
    selection.set_anchor(d(2024, 1, 2), &ctx.bounds);

    let oil = ctx.registry.resolve("Crude oil price (USD per barrel)").unwrap();
    let single = run_query(&ctx, &selection, FieldSelection::Single(oil));
    assert_eq!(single.interval.end, d(2024, 1, 4));
    assert_eq!(single.advisories, vec![Advisory::ClampedToMaximum { max: d(2024, 1, 4) }]);
    let rows = &single.outcome.projection().unwrap().rows;
    let shown: Vec<&str> = rows.iter().map(|r| r.display[0].as_str()).collect();
    assert_eq!(shown, ["7712.00", "-", "7805.00"]);

    let oil100 = ctx.registry.resolve("Crude oil price (USDx100 per barrel)").unwrap();
    let diesel = ctx.registry.resolve_for(ViewMode::Comparison, "diesel").unwrap();
    let compared = run_query(&ctx, &selection, FieldSelection::Compare(oil100, diesel));
    let projection = compared.outcome.projection().unwrap();
    let first_row: Vec<&str> = projection.rows[0].display.iter().map(String::as_str).collect();
    assert_eq!(first_row, ["77.12", "5.12"]);
    assert_eq!(projection.rows[2].display[1], "-");

    let table = format_projection_table(projection);
    assert!(table.ends_with("3 row(s)\n"));
}

#[test]
fn demo_dataset_feeds_both_views() {
    let bounds = DateBounds::new(d(2022, 1, 1), d(2022, 12, 31)).unwrap();
    let models = PredictionModels::default();
    let dataset = generate_dataset(&bounds, &models, 7).unwrap();
    let ctx = AppContext::new(bounds, dataset, FieldRegistry::default(), models).unwrap();

    let mut selection = RangeSelection::new(&ctx.bounds).with_period(PeriodToken::Quarter);
    selection.set_anchor(d(2022, 10, 15), &ctx.bounds);

    let diesel = ctx.registry.resolve_for(ViewMode::Comparison, "diesel").unwrap();
    let predicted = ctx
        .registry
        .resolve_for(ViewMode::Comparison, "diesel_prediction")
        .unwrap();
    let out = run_query(&ctx, &selection, FieldSelection::Compare(diesel, predicted));

    assert!(out.resolved.clamped);
    assert_eq!(out.interval.end, d(2022, 12, 31));
    let projection = out.outcome.projection().unwrap();
    assert!(!projection.is_empty());
    for row in &projection.rows {
        assert!(row.date >= d(2022, 10, 15) && row.date <= d(2022, 12, 31));
        let (actual, fitted) = (row.values[0].unwrap(), row.values[1].unwrap());
        assert!(actual > 0.0 && fitted > 0.0);
    }
}

#[test]
fn comparing_a_field_with_itself_is_flagged_but_projected() {
    let ctx = csv_context();
    let selection = RangeSelection::new(&ctx.bounds).with_period(PeriodToken::Maximum);
    let diesel = ctx.registry.resolve_for(ViewMode::Comparison, "diesel").unwrap();

    let out = run_query(&ctx, &selection, FieldSelection::Compare(diesel, diesel));
    assert!(!out.resolved.clamped);
    assert_eq!(
        out.advisories,
        vec![Advisory::IdenticalFields { label: diesel.label.clone() }]
    );
    assert_eq!(out.outcome.projection().unwrap().series.len(), 2);
}

#[test]
fn default_models_predict_from_slider_values() {
    let query = PredictionQuery {
        oil_price: 100.0,
        exchange_rate: 4.5,
    };
    let prediction = PredictionModels::default().predict(&query);
    assert_relative_eq!(prediction.diesel, 4.41);
    assert_relative_eq!(prediction.super95, 4.24);
}

#[test]
fn export_without_prediction_columns_is_rejected_at_startup() {
    let bounds = DateBounds::new(d(2024, 1, 1), d(2024, 1, 4)).unwrap();
    let dataset = TimeSeriesDataset::read_csv("data;diesel\n2024-01-02;5120\n2024-01-03;5150\n".as_bytes()).unwrap();
    let result = AppContext::new(bounds, dataset, FieldRegistry::default(), PredictionModels::default());
    assert!(result.is_err());
}
