//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - composite keys (`WellKey`, `CurveKey`, `ConditionKey`)
//! - categorical outcomes (`FilterCategory`, `Grade`, `Performance`)
//! - run configuration (`AnalysisConfig`, `SimulationConfig`)

pub mod types;

pub use types::*;
