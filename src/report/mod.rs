//! Reporting utilities: formatted terminal output for ranges, projections
//! and predictions.

pub mod format;

pub use format::*;
