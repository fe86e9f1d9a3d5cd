//! Growth classes from harmonic means of the logistic model.
//!
//! Two harmonic means are computed per curve:
//!
//! - adjusted: `N / Σ 1/(y + A)` (or `y + A·μ` when weighting by growth
//!   rate), graded on four classes
//! - plain: `N / Σ 1/y`, graded on five classes
//!
//! A harmonic mean rewards curves that stay high across the whole run; one
//! low stretch drags it down far more than an arithmetic mean would.

use serde::Serialize;

use crate::domain::{Grade, GradeScale};
use crate::error::CurveError;
use crate::fit::CurveFit;

const FOUR_CLASS_BOUNDS: [f64; 2] = [0.5, 0.32];
const FOUR_CLASS_TOP: f64 = 0.75;
const FIVE_CLASS_BOUNDS: [f64; 3] = [0.256, 0.180, 0.105];
const FIVE_CLASS_TOP: f64 = 0.333;

/// A harmonic mean together with its grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradedMean {
    pub harmonic_mean: f64,
    pub grade: Grade,
}

/// Both classifications of one curve. Each can fail on its own: a degenerate
/// weighting term does not invalidate the plain harmonic mean.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Asymptote-adjusted mean on the four-class scale.
    pub adjusted: Result<GradedMean, CurveError>,
    /// Plain mean on the five-class scale.
    pub plain: Result<GradedMean, CurveError>,
}

/// Asymptote-adjusted harmonic mean. `weight` multiplies the asymptote term
/// (the max growth rate when weighting is enabled).
pub fn harmonic_mean_adjusted(model: &[f64], asymptote: f64, weight: Option<f64>) -> Result<f64, CurveError> {
    if !(asymptote.is_finite() && asymptote != 0.0) {
        return Err(CurveError::DegenerateAsymptote(asymptote));
    }
    let offset = asymptote * weight.unwrap_or(1.0);
    harmonic_mean(model.iter().map(|&y| y + offset)).map_err(|err| match err {
        CurveError::NonPositiveOd { .. } => CurveError::DegenerateAsymptote(offset),
        other => other,
    })
}

/// Harmonic mean of the raw model values.
pub fn harmonic_mean_plain(model: &[f64]) -> Result<f64, CurveError> {
    harmonic_mean(model.iter().copied())
}

fn harmonic_mean(terms: impl Iterator<Item = f64>) -> Result<f64, CurveError> {
    let mut n = 0usize;
    let mut inv_sum = 0.0;
    for (index, term) in terms.enumerate() {
        if term.is_nan() {
            return Err(CurveError::NotComparable);
        }
        if term <= 0.0 {
            return Err(CurveError::NonPositiveOd { index, value: term });
        }
        inv_sum += 1.0 / term;
        n += 1;
    }
    if n == 0 {
        return Err(CurveError::TooFewSamples { needed: 1, got: 0 });
    }
    Ok(n as f64 / inv_sum)
}

/// Grade a harmonic mean. The top class is inclusive, the others exclusive.
pub fn grade(h: f64, scale: GradeScale) -> Grade {
    let (top, bounds): (f64, &[f64]) = match scale {
        GradeScale::Four => (FOUR_CLASS_TOP, &FOUR_CLASS_BOUNDS[..]),
        GradeScale::Five => (FIVE_CLASS_TOP, &FIVE_CLASS_BOUNDS[..]),
    };
    let lower = [Grade::B, Grade::C, Grade::D, Grade::E];

    if h >= top {
        return Grade::A;
    }
    for (bound, g) in bounds.iter().zip(lower) {
        if h > *bound {
            return g;
        }
    }
    lower[bounds.len()]
}

/// Classify one modeled curve.
pub fn classify(fit: &CurveFit, weighted: bool) -> Classification {
    let weight = weighted.then_some(fit.params.max_growth_rate);
    let adjusted = harmonic_mean_adjusted(&fit.model, fit.params.asymptote, weight).map(|h| GradedMean {
        harmonic_mean: h,
        grade: grade(h, GradeScale::Four),
    });
    let plain = harmonic_mean_plain(&fit.model).map(|h| GradedMean {
        harmonic_mean: h,
        grade: grade(h, GradeScale::Five),
    });
    Classification { adjusted, plain }
}
