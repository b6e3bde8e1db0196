//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - dataset vocabulary (`FieldKey`, `ViewMode`, `DateBounds`)
//! - range selection inputs/outputs (`PeriodToken`, `DateInterval`, `ResolvedRange`)
//! - user-facing conditions (`Advisory`) and prediction inputs/outputs

pub mod types;

pub use types::*;
