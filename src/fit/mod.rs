//! Curve modeling.
//!
//! Responsibilities:
//!
//! - extract asymptote, max growth rate and P2 from the median curve
//! - build the lag probe grid
//! - evaluate every probe (parallel) and keep the best-fitting lag

pub mod fitter;
pub mod lag_grid;
pub mod params;

pub use fitter::*;
pub use lag_grid::*;
pub use params::*;
