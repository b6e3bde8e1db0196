//! Command-line parsing for the fuel price dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! range/projection code. Every source option also reads an environment
//! variable, so a `.env` file can pin the dataset and model locations.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{PeriodToken, DEFAULT_MAX_DATE, DEFAULT_MIN_DATE};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fuel", version, about = "Wholesale fuel price dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print one series over a date range.
    Show(ShowArgs),
    /// Print two series side by side over a date range.
    Compare(CompareArgs),
    /// Predict wholesale diesel and Eurosuper 95 prices.
    Predict(PredictArgs),
    /// List the selectable fields for each view.
    Fields,
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
}

/// Where data, models and labels come from. Shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Historical dataset (`;`-separated CSV, date in the first column).
    #[arg(long, global = true, env = "FUEL_DATA", value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Use a generated demo dataset instead of a CSV file.
    #[arg(long, global = true, conflicts_with = "data")]
    pub demo: bool,

    /// Seed for the demo dataset.
    #[arg(long, global = true, default_value_t = 42)]
    pub seed: u64,

    /// Prediction model coefficients (JSON).
    #[arg(long, global = true, env = "FUEL_MODELS", value_name = "JSON")]
    pub models: Option<PathBuf>,

    /// Field label table (JSON). Defaults to the built-in table.
    #[arg(long, global = true, env = "FUEL_FIELDS", value_name = "JSON")]
    pub fields: Option<PathBuf>,

    /// First date of the data (YYYY-MM-DD).
    #[arg(long, global = true, env = "FUEL_MIN_DATE", default_value_t = DEFAULT_MIN_DATE)]
    pub min_date: NaiveDate,

    /// Last date of the data (YYYY-MM-DD); ranges are clamped to it.
    #[arg(long, global = true, env = "FUEL_MAX_DATE", default_value_t = DEFAULT_MAX_DATE)]
    pub max_date: NaiveDate,

    /// Log filter (e.g. `info`, `fuel_dash=debug`).
    #[arg(long, global = true, env = "FUEL_LOG", default_value = "warn")]
    pub log: String,
}

/// Anchor + period + optional refinement.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// Anchor date (YYYY-MM-DD). Defaults to the first configured date.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Period length measured from the anchor.
    #[arg(short = 'p', long, value_enum, default_value_t = PeriodToken::Week)]
    pub period: PeriodToken,

    /// Narrow the resolved range: first date to show.
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Narrow the resolved range: last date to show.
    #[arg(long, value_name = "DATE")]
    pub end: Option<NaiveDate>,
}

/// Output options shared by `show` and `compare`.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render an ASCII plot under the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the projected rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Field label or key (see `fuel fields`).
    #[arg(short = 'f', long, default_value = "diesel")]
    pub field: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// First field label or key.
    #[arg(long, default_value = "diesel")]
    pub first: String,

    /// Second field label or key.
    #[arg(long, default_value = "super95")]
    pub second: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Crude oil price, USD per barrel (0-150).
    #[arg(long, default_value_t = 75.0)]
    pub oil: f64,

    /// USD/PLN exchange rate (1.5-5.0).
    #[arg(long, default_value_t = 4.0)]
    pub rate: f64,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// Write logs to this file while the dashboard is open.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
