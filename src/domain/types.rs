//! Shared domain types.
//!
//! Keys are explicit composite structs so every stage can index flat, ordered
//! containers instead of nesting maps per clone/replicate/source/condition.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Identifies one well: a single replicate of a clone in one growth condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WellKey {
    pub clone: String,
    pub source: String,
    pub condition: String,
    /// 1-based replicate index within the `(clone, source, condition)` group.
    pub replicate: usize,
}

impl WellKey {
    pub fn curve_key(&self) -> CurveKey {
        CurveKey {
            clone: self.clone.clone(),
            source: self.source.clone(),
            condition: self.condition.clone(),
        }
    }
}

/// Identifies a replicate group, i.e. one aggregated curve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveKey {
    pub clone: String,
    pub source: String,
    pub condition: String,
}

impl CurveKey {
    pub fn condition_key(&self) -> ConditionKey {
        ConditionKey {
            source: self.source.clone(),
            condition: self.condition.clone(),
        }
    }
}

impl fmt::Display for CurveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.clone, self.source, self.condition)
    }
}

/// A growth environment shared by an experiment group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConditionKey {
    pub source: String,
    pub condition: String,
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.condition)
    }
}

/// Shape category assigned to a raw replicate curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCategory {
    /// High OD right from the start (contaminated or mis-pipetted well).
    Misfits,
    /// OD drops over the run instead of rising.
    NoGrowth,
    /// Straight-line increase up to the plateau.
    Linear,
    Growth,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 4] = [
        FilterCategory::Misfits,
        FilterCategory::NoGrowth,
        FilterCategory::Linear,
        FilterCategory::Growth,
    ];

    /// Only misfits and no-growth replicates are dropped before aggregation.
    pub fn is_filtered(self) -> bool {
        matches!(self, FilterCategory::Misfits | FilterCategory::NoGrowth)
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::Misfits => "misfits",
            FilterCategory::NoGrowth => "nogrowth",
            FilterCategory::Linear => "linear",
            FilterCategory::Growth => "growth",
        }
    }
}

/// Number of ordered levels used when grading a harmonic mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeScale {
    /// A–D, used with the asymptote-adjusted harmonic mean.
    Four,
    /// A–E, used with the plain harmonic mean.
    Five,
}

/// Growth class. `A` is the best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Zero-based position (A = 0).
    pub fn rank(self) -> usize {
        match self {
            Grade::A => 0,
            Grade::B => 1,
            Grade::C => 2,
            Grade::D => 3,
            Grade::E => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::A => "Class A",
            Grade::B => "Class B",
            Grade::C => "Class C",
            Grade::D => "Class D",
            Grade::E => "Class E",
        }
    }
}

/// Predicted performance of a clone relative to the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Worst,
    Equal,
    Better,
}

impl Performance {
    pub fn label(self) -> &'static str {
        match self {
            Performance::Worst => "worst",
            Performance::Equal => "equal",
            Performance::Better => "better",
        }
    }
}

/// Default sliding-window size (in samples) for the max growth rate.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Knobs consumed by the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Classify raw replicates and drop misfits/no-growth before aggregation.
    pub filter: bool,
    /// Weight the asymptote term of the harmonic mean by the max growth rate.
    pub weighted_harmonic_mean: bool,
    /// Window size for the max growth rate (must be > 2).
    pub window_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filter: false,
            weighted_harmonic_mean: false,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.window_size <= 2 {
            return Err(AppError::new(
                2,
                format!("Window size must be an integer larger than 2 (got {}).", self.window_size),
            ));
        }
        Ok(())
    }
}

/// Where and under which name reports are written.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub dir: PathBuf,
    pub prefix: String,
}

/// Parameters for generating a synthetic plate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub clones: usize,
    pub conditions: usize,
    pub replicates: usize,
    /// Total run length in hours.
    pub hours: f64,
    /// Sampling interval in hours.
    pub step: f64,
    pub seed: u64,
    /// Standard deviation of the Gaussian OD noise added per reading.
    pub noise: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clones: 3,
            conditions: 8,
            replicates: 3,
            hours: 48.0,
            step: 0.5,
            seed: 42,
            noise: 0.005,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.clones == 0 || self.conditions == 0 || self.replicates == 0 {
            return Err(AppError::new(2, "Clone, condition and replicate counts must be >= 1."));
        }
        if !(self.hours.is_finite() && self.hours > 0.0) {
            return Err(AppError::new(2, format!("Invalid run length: {} h.", self.hours)));
        }
        if !(self.step.is_finite() && self.step > 0.0 && self.step < self.hours) {
            return Err(AppError::new(2, format!("Invalid sampling step: {} h.", self.step)));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(AppError::new(2, format!("Invalid noise level: {}.", self.noise)));
        }
        Ok(())
    }
}
