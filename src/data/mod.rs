//! Historical data sources.
//!
//! - `dataset`: the immutable date-indexed table and its CSV loader
//! - `sample`: a seeded synthetic dataset for demos and tests

pub mod dataset;
pub mod sample;

pub use dataset::{Record, TimeSeriesDataset};
pub use sample::generate_dataset;
