//! Date range resolution.
//!
//! - `resolver`: anchor + period token -> clamped interval, plus refinement
//! - `selection`: per-view state feeding the resolver

pub mod resolver;
pub mod selection;

pub use resolver::{naive_end, refine, resolve};
pub use selection::{Handle, RangeSelection};
