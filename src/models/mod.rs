//! Fuel price predictors.
//!
//! Predictors are small pure functions behind the `PricePredictor` trait so the
//! front-ends do not care where the coefficients came from.

pub mod model;

pub use model::*;
