//! Plate data and the stages that run before modeling.
//!
//! - in-memory plate (`dataset`)
//! - replicate shape filter (`filter`)
//! - replicate median/stdev aggregation (`aggregate`)
//! - synthetic plate generator (`sample`)

pub mod aggregate;
pub mod dataset;
pub mod filter;
pub mod sample;

pub use aggregate::*;
pub use dataset::*;
pub use filter::*;
pub use sample::*;
