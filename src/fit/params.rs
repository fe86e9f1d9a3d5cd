//! Growth parameters extracted directly from an aggregated curve.
//!
//! - asymptote: highest 3-sample sliding-window mean
//! - max growth rate: second-highest windowed rate
//!   `2.303 · (log10 OD_end − log10 OD_start) / (t_end − t_start)`
//! - P2: the second reading, used as the model's initial anchor
//!
//! The single highest windowed rate is discarded on purpose: one noisy
//! reading is enough to produce it.

use serde::Serialize;

use crate::error::CurveError;

/// Samples averaged per asymptote window.
const ASYMPTOTE_WINDOW: usize = 3;
/// Scale factor turning a base-10 log difference into a natural-log rate.
const LN10_APPROX: f64 = 2.303;

/// Max growth rate and where it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRate {
    pub rate: f64,
    /// Time at the centre of the selected window.
    pub time: f64,
    /// Index of the first sample of the selected window.
    pub window_start: usize,
}

/// Parameters derived from the curve before the lag search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthParams {
    pub asymptote: f64,
    pub max_growth_rate: f64,
    pub max_growth_time: f64,
    pub p2: f64,
}

/// Highest mean over 3-sample windows. Windows start at sample 1 and stop
/// before the last sample.
pub fn asymptote(curve: &[f64]) -> Result<f64, CurveError> {
    let needed = ASYMPTOTE_WINDOW + 2;
    if curve.len() < needed {
        return Err(CurveError::TooFewSamples {
            needed,
            got: curve.len(),
        });
    }

    let last_start = curve.len() - ASYMPTOTE_WINDOW - 1;
    let mut best = f64::NEG_INFINITY;
    for start in 1..=last_start {
        let window = &curve[start..start + ASYMPTOTE_WINDOW];
        let m = window.iter().sum::<f64>() / ASYMPTOTE_WINDOW as f64;
        if m > best {
            best = m;
        }
    }

    if !(best.is_finite() && best > 0.0) {
        return Err(CurveError::DegenerateAsymptote(best));
    }
    Ok(best)
}

/// Second-highest growth rate over windows spanning `window` samples.
///
/// Window `a` compares sample `a` with sample `a + window`. Rates are sorted
/// descending with a stable sort, so equal rates keep time order.
pub fn max_growth_rate(curve: &[f64], time: &[f64], window: usize) -> Result<GrowthRate, CurveError> {
    let n = curve.len().min(time.len());
    // Two windows are needed to discard the top one.
    let needed = window + 2;
    if window == 0 || n < needed {
        return Err(CurveError::TooFewSamples { needed, got: n });
    }

    if let Some(index) = curve[..n].iter().position(|&v| !(v > 0.0)) {
        return Err(CurveError::NonPositiveOd {
            index,
            value: curve[index],
        });
    }

    let rates: Vec<f64> = (0..n - window)
        .map(|a| {
            let b = a + window;
            LN10_APPROX * (curve[b].log10() - curve[a].log10()) / (time[b] - time[a])
        })
        .collect();

    let mut order: Vec<usize> = (0..rates.len()).collect();
    order.sort_by(|&i, &j| rates[j].partial_cmp(&rates[i]).unwrap_or(std::cmp::Ordering::Equal));

    let start = order[1];
    Ok(GrowthRate {
        rate: rates[start],
        time: time[start + window / 2],
        window_start: start,
    })
}

/// The second reading of the curve.
pub fn p2(curve: &[f64]) -> Result<f64, CurveError> {
    curve
        .get(1)
        .copied()
        .ok_or(CurveError::TooFewSamples { needed: 2, got: curve.len() })
}

/// Extract asymptote, max growth rate and P2 from an aggregated curve.
pub fn extract_params(curve: &[f64], time: &[f64], window: usize) -> Result<GrowthParams, CurveError> {
    if curve.iter().any(|v| !v.is_finite()) {
        return Err(CurveError::NotComparable);
    }
    let asymptote = asymptote(curve)?;
    let growth = max_growth_rate(curve, time, window)?;
    let p2 = p2(curve)?;
    Ok(GrowthParams {
        asymptote,
        max_growth_rate: growth.rate,
        max_growth_time: growth.time,
        p2,
    })
}
