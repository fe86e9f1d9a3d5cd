//! Shape-based classification of raw replicate curves.
//!
//! Each replicate falls into exactly one category, tested in this order
//! (first match wins):
//!
//! 1. `Misfits`: any of the first readings (~2 h) is already at or above
//!    `MISFIT_OD`
//! 2. `NoGrowth`: the 1 h reading is at least `NO_GROWTH_MARGIN` above the
//!    24 h reading
//! 3. `Linear`: every 2-sample rate between hour 2 and the plateau stays
//!    within ±30 % of the rate around the plateau
//! 4. `Growth`: everything else
//!
//! Only misfits and no-growth replicates are excluded from aggregation.

use serde::Serialize;

use crate::data::DataSet;
use crate::domain::{FilterCategory, WellKey};

/// OD at or above which an early reading marks the well as a misfit.
pub const MISFIT_OD: f64 = 0.18;
/// Number of leading samples checked for misfits.
pub const EARLY_SAMPLES: usize = 4;
/// Sample index of the 1 h reading.
pub const ONE_HOUR_SAMPLE: usize = 1;
/// Sample index of the 24 h reading (half-hourly plates). Clamped to the last
/// sample on shorter runs.
pub const DAY_SAMPLE: usize = 47;
pub const NO_GROWTH_MARGIN: f64 = 0.03;
/// Relative band around the target rate for the linearity test.
pub const LINEAR_TOLERANCE: f64 = 0.30;
/// First sample (hour 2) of the linearity test.
const LINEAR_START_SAMPLE: usize = 3;
const RATE_DIVISOR: f64 = 60.0;

/// Filter decision for one replicate.
#[derive(Debug, Clone, Serialize)]
pub struct FilterRecord {
    pub key: WellKey,
    pub category: FilterCategory,
}

/// Classify one replicate's OD sequence.
pub fn classify_replicate(od: &[f64]) -> FilterCategory {
    if od.iter().take(EARLY_SAMPLES).any(|&v| v >= MISFIT_OD) {
        return FilterCategory::Misfits;
    }

    if od.len() > ONE_HOUR_SAMPLE {
        let day = od[DAY_SAMPLE.min(od.len() - 1)];
        if od[ONE_HOUR_SAMPLE] >= day + NO_GROWTH_MARGIN {
            return FilterCategory::NoGrowth;
        }
    }

    if is_linear(od) {
        FilterCategory::Linear
    } else {
        FilterCategory::Growth
    }
}

fn is_linear(od: &[f64]) -> bool {
    let Some(pos) = plateau_position(od) else {
        return false;
    };
    // A plateau reached within the first three samples says nothing about
    // linearity.
    if pos <= LINEAR_START_SAMPLE {
        return false;
    }

    let target = (od[pos + 1] - od[pos - 1]) / RATE_DIVISOR;
    let band = target * LINEAR_TOLERANCE;
    (LINEAR_START_SAMPLE..pos - 1).all(|i| {
        let rate = (od[i + 2] - od[i]) / RATE_DIVISOR;
        !(rate < target - band || rate > target + band)
    })
}

/// Centre of the highest 3-sample window mean, scanning windows that start at
/// sample 1. `None` when no window mean is positive.
fn plateau_position(od: &[f64]) -> Option<usize> {
    if od.len() < 4 {
        return None;
    }
    let mut best = 0.0;
    let mut pos = None;
    for start in 1..od.len() - 2 {
        let m = (od[start] + od[start + 1] + od[start + 2]) / 3.0;
        if best < m {
            best = m;
            pos = Some(start + 1);
        }
    }
    pos
}

/// Classify every well, set the filter flags, and return one record per well
/// in input order.
pub fn apply_filter(dataset: &mut DataSet) -> Vec<FilterRecord> {
    let records: Vec<FilterRecord> = dataset
        .wells()
        .iter()
        .map(|w| FilterRecord {
            key: w.key.clone(),
            category: classify_replicate(&w.od),
        })
        .collect();

    for r in &records {
        dataset.set_filtered(&r.key, r.category.is_filtered());
        if r.category.is_filtered() {
            log::debug!(
                "filtered {} replicate {} ({})",
                r.key.curve_key(),
                r.key.replicate,
                r.category.label()
            );
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logistic_like(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.5;
                0.08 + 0.9 / (1.0 + (-(t - 10.0) * 0.6).exp())
            })
            .collect()
    }

    #[test]
    fn high_early_reading_is_misfit() {
        let mut od = logistic_like(96);
        od[2] = 0.18;
        assert_eq!(classify_replicate(&od), FilterCategory::Misfits);
    }

    #[test]
    fn declining_curve_is_no_growth() {
        let od: Vec<f64> = (0..96).map(|i| 0.15 - i as f64 * 0.001).collect();
        assert_eq!(classify_replicate(&od), FilterCategory::NoGrowth);
    }

    #[test]
    fn short_run_compares_against_last_sample() {
        // Ten samples: the 24 h index falls back to sample 9.
        let od: Vec<f64> = (0..10).map(|i| 0.15 - i as f64 * 0.01).collect();
        assert_eq!(classify_replicate(&od), FilterCategory::NoGrowth);

        let rising: Vec<f64> = (0..10).map(|i| 0.05 + i as f64 * 0.01).collect();
        assert_ne!(classify_replicate(&rising), FilterCategory::NoGrowth);
    }

    #[test]
    fn high_reading_after_early_samples_is_not_misfit() {
        let mut od = logistic_like(96);
        od[EARLY_SAMPLES] = 0.3;
        assert_eq!(classify_replicate(&od), FilterCategory::Growth);
    }

    #[test]
    fn straight_line_is_linear() {
        let od: Vec<f64> = (0..96).map(|i| 0.05 + i as f64 * 0.01).collect();
        assert_eq!(classify_replicate(&od), FilterCategory::Linear);
    }

    #[test]
    fn sigmoid_is_growth() {
        assert_eq!(classify_replicate(&logistic_like(96)), FilterCategory::Growth);
    }

    #[test]
    fn early_plateau_is_not_linear() {
        let mut od = vec![0.1; 20];
        od[2] = 0.15;
        od[3] = 0.15;
        assert_eq!(classify_replicate(&od), FilterCategory::Growth);
    }

    #[test]
    fn misfit_wins_over_no_growth() {
        // Satisfies both the misfit and the no-growth rule.
        let od: Vec<f64> = (0..96).map(|i| 0.5 - i as f64 * 0.004).collect();
        assert_eq!(classify_replicate(&od), FilterCategory::Misfits);
    }

    #[test]
    fn classification_is_deterministic() {
        let od = logistic_like(60);
        let first = classify_replicate(&od);
        for _ in 0..5 {
            assert_eq!(classify_replicate(&od), first);
        }
    }

    #[test]
    fn apply_filter_flags_only_dropped_categories() {
        let mut ds = DataSet::new((0..96).map(|i| i as f64 * 0.5).collect()).unwrap();
        let key = |r: usize| WellKey {
            clone: "WT".to_string(),
            source: "C".to_string(),
            condition: "Glc".to_string(),
            replicate: r,
        };
        ds.push_well(key(1), "A1", logistic_like(96)).unwrap();
        let mut misfit = logistic_like(96);
        misfit[0] = 0.3;
        ds.push_well(key(2), "A1", misfit).unwrap();

        let records = apply_filter(&mut ds);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, FilterCategory::Growth);
        assert_eq!(records[1].category, FilterCategory::Misfits);
        assert!(!ds.well(&key(1)).unwrap().filtered);
        assert!(ds.well(&key(2)).unwrap().filtered);
    }
}
