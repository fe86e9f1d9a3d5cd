//! Numeric helpers shared by aggregation and similarity scoring.

pub mod stats;

pub use stats::*;
