//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - loads the dataset, field table and models into an [`AppContext`]
//! - prints reports/plots or launches the dashboard
//! - writes optional exports

use clap::Parser;
use tracing::{debug, warn};

use crate::cli::{Cli, Command, CompareArgs, OutputArgs, PredictArgs, RangeArgs, ShowArgs, TuiArgs};
use crate::config::AppConfig;
use crate::domain::{DateBounds, PredictionQuery, ViewMode};
use crate::error::{AppError, EXIT_INPUT};
use crate::fields::{FieldRegistry, FieldSpec};
use crate::range::RangeSelection;
use crate::telemetry::{self, LogSink};

pub mod context;
pub mod pipeline;

pub use context::AppContext;
use pipeline::{FieldSelection, QueryOutput};

const SUBCOMMANDS: [&str; 5] = ["show", "compare", "predict", "fields", "tui"];

/// Flags that consume the next argument as their value.
const VALUE_FLAGS: [&str; 8] = [
    "--data",
    "--seed",
    "--models",
    "--fields",
    "--min-date",
    "--max-date",
    "--log",
    "--log-file",
];

/// Entry point for the `fuel` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    let dotenv = dotenvy::dotenv().ok();

    // We want `fuel` and `fuel --demo` to behave like `fuel tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    let config = AppConfig::from_args(&cli.source)?;

    let sink = match &cli.command {
        Command::Tui(args) => args.log_file.as_deref().map_or(LogSink::Discard, LogSink::File),
        _ => LogSink::Stderr,
    };
    telemetry::init(&config.log_filter, sink)?;
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded environment file");
    }

    match &cli.command {
        Command::Fields => handle_fields(&config),
        Command::Predict(args) => handle_predict(&config, args),
        Command::Show(args) => handle_show(&AppContext::load(&config)?, args),
        Command::Compare(args) => handle_compare(&AppContext::load(&config)?, args),
        Command::Tui(args) => handle_tui(&config, args),
    }
}

fn handle_fields(config: &AppConfig) -> Result<(), AppError> {
    let registry = context::load_registry(config)?;
    print!("{}", crate::report::format_field_list(&registry));
    Ok(())
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<(), AppError> {
    let models = context::load_models(config)?;
    let query = PredictionQuery {
        oil_price: args.oil,
        exchange_rate: args.rate,
    };
    // NaN never equals its clamped self, so it is rejected here too.
    if query.clamped() != query {
        return Err(AppError::new(
            EXIT_INPUT,
            format!(
                "Prediction inputs out of range: oil {} (0-150 USD/bbl), rate {} (1.5-5.0 PLN)",
                args.oil, args.rate
            ),
        ));
    }

    let prediction = models.predict(&query);
    print!("{}", crate::report::format_prediction(&query, &prediction));
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &ShowArgs) -> Result<(), AppError> {
    let field = lookup_field(&ctx.registry, ViewMode::Single, &args.field)?;
    let selection = selection_from_args(&args.range, &ctx.bounds)?;
    let output = pipeline::run_query(ctx, &selection, FieldSelection::Single(field));
    print_query(&selection, &output, &args.output)
}

fn handle_compare(ctx: &AppContext, args: &CompareArgs) -> Result<(), AppError> {
    let first = lookup_field(&ctx.registry, ViewMode::Comparison, &args.first)?;
    let second = lookup_field(&ctx.registry, ViewMode::Comparison, &args.second)?;
    let selection = selection_from_args(&args.range, &ctx.bounds)?;
    let output = pipeline::run_query(ctx, &selection, FieldSelection::Compare(first, second));
    print_query(&selection, &output, &args.output)
}

fn handle_tui(config: &AppConfig, _args: &TuiArgs) -> Result<(), AppError> {
    let ctx = AppContext::load(config)?;
    crate::tui::run(&ctx)
}

fn print_query(selection: &RangeSelection, output: &QueryOutput, opts: &OutputArgs) -> Result<(), AppError> {
    print!(
        "{}",
        crate::report::format_range_summary(selection.anchor(), selection.period(), output)
    );
    print!("{}", crate::report::format_advisories(&output.advisories));

    let Some(projection) = output.outcome.projection() else {
        if opts.export.is_some() {
            warn!("nothing to export for a single-day range");
        }
        return Ok(());
    };

    println!();
    print!("{}", crate::report::format_legend(projection));
    println!();
    print!("{}", crate::report::format_projection_table(projection));

    if opts.plot {
        println!();
        print!(
            "{}",
            crate::plot::render_projection_plot(projection, opts.width, opts.height)
        );
    }

    if let Some(path) = &opts.export {
        crate::io::write_projection_csv(path, projection)?;
    }

    Ok(())
}

/// Look up a label or key in one view, listing the valid labels on failure.
fn lookup_field<'a>(registry: &'a FieldRegistry, mode: ViewMode, arg: &str) -> Result<&'a FieldSpec, AppError> {
    registry.resolve_for(mode, arg).ok_or_else(|| {
        AppError::new(
            EXIT_INPUT,
            format!(
                "Unknown field '{arg}' for the {} view. Valid labels: {}",
                mode.display_name(),
                registry.labels(mode).join(", ")
            ),
        )
    })
}

/// Build a range selection from command-line flags.
///
/// Unlike the dashboard, the command line does not silently move an anchor
/// that lies outside the configured dates.
pub fn selection_from_args(range: &RangeArgs, bounds: &DateBounds) -> Result<RangeSelection, AppError> {
    let mut selection = RangeSelection::new(bounds).with_period(range.period);

    if let Some(from) = range.from {
        if !bounds.contains(from) {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("Anchor date {from} is outside {} .. {}", bounds.min, bounds.max),
            ));
        }
        selection.set_anchor(from, bounds);
    }

    if range.start.is_some() || range.end.is_some() {
        selection.set_refinement(range.start, range.end, bounds)?;
    }

    Ok(selection)
}

/// Rewrite argv so `fuel` defaults to `fuel tui`.
///
/// Rules:
/// - `fuel`                      -> `fuel tui`
/// - `fuel --demo ...`           -> `fuel tui --demo ...`
/// - `fuel --data x.csv show`    -> unchanged (a subcommand is present)
/// - `fuel --data show`          -> `fuel tui --data show` (`show` is a file name)
/// - `fuel --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = first_positional(&argv[1..]).is_some_and(|a| SUBCOMMANDS.contains(&a));
    if has_subcommand {
        return argv;
    }

    // Only flags: treat them as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

/// First argument that is neither a flag nor a flag's value.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with('-') {
            return Some(arg);
        }
    }
    None
}
