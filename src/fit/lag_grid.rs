//! Lag probe grid.
//!
//! The lag is found by exhaustive search over `k · step` for every `k` with
//! `k · step < duration`. The default 0.4 h step (~25 min) probes lags finer
//! than the half-hourly sampling grid.

use crate::error::CurveError;

/// Default probe spacing in hours.
pub const LAG_STEP: f64 = 0.4;

/// Probe values `0, step, 2·step, …` strictly below `duration`.
pub fn probe_grid(duration: f64, step: f64) -> Result<Vec<f64>, CurveError> {
    if !(duration.is_finite() && duration > 0.0 && step.is_finite() && step > 0.0) {
        return Err(CurveError::EmptyProbeGrid(duration));
    }
    let count = (duration / step).ceil() as usize;
    Ok((0..count)
        .map(|k| k as f64 * step)
        .take_while(|&p| p < duration)
        .collect())
}

/// Probe grid for an experiment time vector (duration = last time point).
pub fn probe_grid_for(time: &[f64]) -> Result<Vec<f64>, CurveError> {
    let duration = time.last().copied().unwrap_or(0.0);
    probe_grid(duration, LAG_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_starts_at_zero_and_stays_below_duration() {
        let grid = probe_grid(2.0, 0.4).unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0], 0.0);
        assert!(grid.iter().all(|&p| p < 2.0));
        assert!((grid[4] - 1.6).abs() < 1e-12);
    }

    #[test]
    fn partial_step_is_included() {
        let grid = probe_grid(1.0, 0.4).unwrap();
        assert_eq!(grid.len(), 3);
        assert!((grid[2] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rounding_never_reaches_duration() {
        let duration = 0.4 * 3.0;
        let grid = probe_grid(duration, 0.4).unwrap();
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|&p| p < duration));
    }

    #[test]
    fn empty_duration_is_rejected() {
        assert_eq!(probe_grid(0.0, 0.4), Err(CurveError::EmptyProbeGrid(0.0)));
        assert!(probe_grid_for(&[]).is_err());
    }
}
