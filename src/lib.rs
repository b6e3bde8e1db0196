//! `fuel-dash` library crate.
//!
//! The binary (`fuel`) is a thin wrapper around this library so that:
//!
//! - range resolution and projection are testable without spawning processes
//! - the command line and the dashboard share one query pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fields;
pub mod io;
pub mod models;
pub mod plot;
pub mod project;
pub mod range;
pub mod report;
pub mod telemetry;
pub mod tui;
