//! Logistic fitting for a single aggregated curve.
//!
//! Given the extracted asymptote, max growth rate and P2, the only free
//! parameter is the lag `L`. For each probe lag we:
//! - evaluate the logistic model on the experiment time points
//! - compute the fit residual `mean |y − (y + ŷ)/2|`
//!
//! and keep the probe with the smallest residual. Ties go to the earliest
//! probe, so the result does not depend on how the probes were scheduled.

use rayon::prelude::*;
use serde::Serialize;

use crate::data::AggregatedCurve;
use crate::domain::CurveKey;
use crate::error::CurveError;
use crate::fit::params::{GrowthParams, extract_params};
use crate::models::{LogisticParams, predict_curve};

/// Best lag for one curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LagFit {
    pub lag: f64,
    pub probe_index: usize,
    pub residual: f64,
    /// Model evaluated at the experiment time points with the chosen lag.
    pub model: Vec<f64>,
}

/// Fully modeled curve.
#[derive(Debug, Clone, Serialize)]
pub struct CurveFit {
    pub key: CurveKey,
    pub well: String,
    pub params: GrowthParams,
    pub lag: f64,
    pub residual: f64,
    pub model: Vec<f64>,
}

/// Mean deviation of the data from the data/model midpoint.
///
/// Equivalent to half the mean absolute error; kept in this form because the
/// reported residual values are defined this way.
pub fn fit_residual(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return f64::NAN;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&y, &y_hat)| (y - (y + y_hat) / 2.0).abs())
        .sum();
    total / n as f64
}

/// Residual of the logistic model for one candidate lag.
pub fn lag_residual(actual: &[f64], time: &[f64], params: &GrowthParams, lag: f64) -> f64 {
    let model = predict_curve(&to_logistic(params, lag), time);
    fit_residual(actual, &model)
}

/// Exhaustive lag search over `probes`.
pub fn select_lag(
    actual: &[f64],
    time: &[f64],
    params: &GrowthParams,
    probes: &[f64],
) -> Result<LagFit, CurveError> {
    if probes.is_empty() {
        return Err(CurveError::EmptyProbeGrid(time.last().copied().unwrap_or(0.0)));
    }

    let residuals: Vec<f64> = probes
        .par_iter()
        .map(|&lag| lag_residual(actual, time, params, lag))
        .collect();

    // Deterministic selection: strict `<` keeps the lowest probe on ties.
    let mut best: Option<(usize, f64)> = None;
    for (idx, &r) in residuals.iter().enumerate() {
        if !r.is_finite() {
            continue;
        }
        match best {
            Some((_, best_r)) if r >= best_r => {}
            _ => best = Some((idx, r)),
        }
    }

    let Some((probe_index, residual)) = best else {
        return Err(CurveError::NotComparable);
    };

    let lag = probes[probe_index];
    Ok(LagFit {
        lag,
        probe_index,
        residual,
        model: predict_curve(&to_logistic(params, lag), time),
    })
}

/// Extract parameters and select the lag for one aggregated curve.
pub fn fit_curve(
    curve: &AggregatedCurve,
    time: &[f64],
    probes: &[f64],
    window: usize,
) -> Result<CurveFit, CurveError> {
    if !curve.is_comparable() {
        return Err(CurveError::NotComparable);
    }
    let params = extract_params(&curve.median, time, window)?;
    let lag_fit = select_lag(&curve.median, time, &params, probes)?;

    log::debug!(
        "{}: A={:.4} mu={:.4} p2={:.4} lag={:.1} residual={:.5}",
        curve.key,
        params.asymptote,
        params.max_growth_rate,
        params.p2,
        lag_fit.lag,
        lag_fit.residual
    );

    Ok(CurveFit {
        key: curve.key.clone(),
        well: curve.well.clone(),
        params,
        lag: lag_fit.lag,
        residual: lag_fit.residual,
        model: lag_fit.model,
    })
}

fn to_logistic(params: &GrowthParams, lag: f64) -> LogisticParams {
    LogisticParams {
        p2: params.p2,
        asymptote: params.asymptote,
        max_growth_rate: params.max_growth_rate,
        lag,
    }
}
