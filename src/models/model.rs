//! Logistic growth model.
//!
//! ```text
//! y(t) = p2 + (A - p2) / (1 + exp((μ / A) · (L - t) + 2))
//! ```
//!
//! `p2` anchors the curve at the second reading (the first one is taken
//! before the plate reaches temperature), `A` is the asymptote, `μ` the max
//! growth rate and `L` the lag time.

use serde::{Deserialize, Serialize};

/// Parameters of a logistic curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub p2: f64,
    pub asymptote: f64,
    pub max_growth_rate: f64,
    pub lag: f64,
}

/// Evaluate the model at time `t`.
pub fn predict(params: &LogisticParams, t: f64) -> f64 {
    let exponent = (params.max_growth_rate / params.asymptote) * (params.lag - t) + 2.0;
    params.p2 + (params.asymptote - params.p2) / (1.0 + exponent.exp())
}

/// Evaluate the model on every experiment time point.
pub fn predict_curve(params: &LogisticParams, time: &[f64]) -> Vec<f64> {
    time.iter().map(|&t| predict(params, t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LogisticParams {
        LogisticParams {
            p2: 0.1,
            asymptote: 1.0,
            max_growth_rate: 0.5,
            lag: 4.0,
        }
    }

    #[test]
    fn curve_rises_from_anchor_to_asymptote() {
        let p = params();
        let early = predict(&p, 0.0);
        let late = predict(&p, 200.0);
        assert!(early > p.p2 && early < 0.3);
        assert!((late - p.asymptote).abs() < 1e-9);
    }

    #[test]
    fn value_at_lag_is_fixed_fraction() {
        // At t = L the exponent is exactly 2.
        let p = params();
        let expected = p.p2 + (p.asymptote - p.p2) / (1.0 + 2.0_f64.exp());
        assert!((predict(&p, p.lag) - expected).abs() < 1e-15);
    }

    #[test]
    fn huge_exponent_saturates_to_anchor() {
        let p = LogisticParams { lag: 1e6, ..params() };
        let y = predict(&p, 0.0);
        assert!(y.is_finite());
        assert!((y - p.p2).abs() < 1e-12);
    }
}
