//! Interactive dataset picker.
//!
//! Used when neither `--data` nor `--demo` is given: lists `*.csv` files under
//! the working directory and lets the user pick one by number or path, or
//! fall back to the demo dataset.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppError, EXIT_INPUT};

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 3;

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetChoice {
    File(PathBuf),
    Demo,
}

/// Prompt on stdin/stdout.
///
/// Without a terminal on stdin there is nobody to ask, so the demo dataset is used.
pub fn prompt_for_dataset() -> Result<DatasetChoice, AppError> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        info!("stdin is not a terminal; using the demo dataset");
        return Ok(DatasetChoice::Demo);
    }
    let files = discover_csv_files(Path::new("."));
    let stdout = io::stdout();
    pick_dataset(&files, &mut stdin.lock(), &mut stdout.lock())
}

/// Picker loop over arbitrary input/output.
///
/// - a number selects from `files`
/// - `d` (or empty input when nothing was found) selects the demo dataset
/// - `q` cancels
/// - anything else is treated as a path
pub fn pick_dataset<R: BufRead, W: Write>(
    files: &[PathBuf],
    input: &mut R,
    out: &mut W,
) -> Result<DatasetChoice, AppError> {
    let io_err = |e: io::Error| AppError::new(EXIT_INPUT, format!("Failed to write prompt: {e}"));

    if files.is_empty() {
        writeln!(out, "No .csv files found under the current directory.").map_err(io_err)?;
    } else {
        writeln!(out, "Found {} CSV file(s):", files.len()).map_err(io_err)?;
        for (idx, path) in files.iter().enumerate() {
            writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
        }
    }

    loop {
        if files.is_empty() {
            write!(out, "Type a CSV path, d for demo data, q to quit: ").map_err(io_err)?;
        } else {
            write!(
                out,
                "Select a file (1-{}), type a path, d for demo data, q to quit: ",
                files.len()
            )
            .map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(
                EXIT_INPUT,
                "No input received. Pass a dataset with `--data <file.csv>` or use `--demo`.",
            ));
        }

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Err(AppError::new(EXIT_INPUT, "Canceled."));
        }
        if answer.eq_ignore_ascii_case("d") || (answer.is_empty() && files.is_empty()) {
            return Ok(DatasetChoice::Demo);
        }

        if let Ok(choice) = answer.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return Ok(DatasetChoice::File(files[choice - 1].clone()));
            }
            writeln!(out, "Invalid choice: {choice}.").map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(answer)) {
            Ok(path) => return Ok(DatasetChoice::File(path)),
            Err(err) => writeln!(out, "{err}").map_err(io_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// `*.csv` files under `root`, sorted for a stable listing.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > DEFAULT_SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || matches!(name, "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
