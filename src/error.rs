//! Error types.
//!
//! Two layers:
//!
//! - `AppError` aborts the run and carries the process exit code
//!   (2 = input/usage/IO, 3 = nothing analyzable, 4 = numeric/internal)
//! - `CurveError` is scoped to a single aggregated curve; the pipeline records
//!   it, excludes the curve from downstream scoring, and keeps going

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Numeric failure while modeling one curve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// A log or ratio was requested on an OD value that is zero or negative.
    #[error("non-positive OD {value} at sample {index}")]
    NonPositiveOd { index: usize, value: f64 },

    /// The asymptote (or an asymptote-derived term) cannot be used as a divisor.
    #[error("degenerate asymptote: {0}")]
    DegenerateAsymptote(f64),

    /// The curve is too short for the sliding windows.
    #[error("need at least {needed} samples, got {got}")]
    TooFewSamples { needed: usize, got: usize },

    /// The curve (or the control it is compared to) carries NaN readings.
    #[error("curve is not comparable (undefined readings)")]
    NotComparable,

    /// No lag probe fits inside the experiment duration.
    #[error("lag probe grid is empty for duration {0}")]
    EmptyProbeGrid(f64),
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(4, err.to_string())
    }
}
