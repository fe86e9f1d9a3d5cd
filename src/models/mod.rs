//! Growth model implementations.
//!
//! Models are small, pure functions so the lag search can evaluate them over
//! many probe values without allocation beyond the predicted curve.

pub mod model;

pub use model::*;
