//! Input/output helpers.
//!
//! - projection exports (`export`)
//!
//! Dataset loading lives next to the dataset type in `crate::data`.

pub mod export;

pub use export::*;
