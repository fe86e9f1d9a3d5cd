//! Control-vs-clone comparison within each growth condition.
//!
//! Within a condition group the first clone present (in clone order) is the
//! control. Every member's logistic model is compared to the control's with
//! an antilog mean ratio `R = 10^(mean log10(control / clone))`, which is then
//! bucketed into a score in `-4..=4`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{CurveKey, Performance};
use crate::error::CurveError;

/// Score thresholds on `R`, checked in descending order. `R` above the first
/// bound scores `-4`; `R` at or below the last scores `4`.
const SCORE_BOUNDS: [(f64, i8); 8] = [
    (2.0, -4),
    (1.75, -3),
    (1.5, -2),
    (1.25, -1),
    (0.875, 0),
    (0.75, 1),
    (0.625, 2),
    (0.5, 3),
];

/// Outcome of comparing one curve with its group's control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub ratio: f64,
    pub score: i8,
    pub performance: Performance,
}

impl Comparison {
    pub fn from_ratio(ratio: f64) -> Self {
        let score = score(ratio);
        Self {
            ratio,
            score,
            performance: performance(score),
        }
    }
}

/// Antilog of the mean log10 ratio between control and clone model values.
pub fn antilog_ratio(control: &[f64], clone: &[f64]) -> Result<f64, CurveError> {
    let n = control.len().min(clone.len());
    if n == 0 {
        return Err(CurveError::TooFewSamples { needed: 1, got: 0 });
    }

    let mut total = 0.0;
    for i in 0..n {
        let (c, y) = (control[i], clone[i]);
        if c.is_nan() || y.is_nan() {
            return Err(CurveError::NotComparable);
        }
        if c <= 0.0 {
            return Err(CurveError::NonPositiveOd { index: i, value: c });
        }
        if y <= 0.0 {
            return Err(CurveError::NonPositiveOd { index: i, value: y });
        }
        total += (c / y).log10();
    }
    Ok(10f64.powf(total / n as f64))
}

pub fn score(ratio: f64) -> i8 {
    SCORE_BOUNDS
        .iter()
        .find(|(bound, _)| ratio > *bound)
        .map(|&(_, s)| s)
        .unwrap_or(4)
}

pub fn performance(score: i8) -> Performance {
    match score {
        i8::MIN..=-2 => Performance::Worst,
        -1..=1 => Performance::Equal,
        _ => Performance::Better,
    }
}

/// Compare every curve with the control of its condition group.
///
/// `curves` pairs each key with its model (`None` when the curve could not be
/// modeled). `clones` gives the control precedence. Results are returned in
/// the order of `curves`.
pub fn compare_groups(
    curves: &[(CurveKey, Option<&[f64]>)],
    clones: &[String],
) -> Vec<Result<Comparison, CurveError>> {
    let clone_rank = |clone: &str| clones.iter().position(|c| c == clone).unwrap_or(usize::MAX);

    // Control per condition: lowest clone rank, first occurrence on ties.
    let mut controls: BTreeMap<_, usize> = BTreeMap::new();
    for (idx, (key, _)) in curves.iter().enumerate() {
        let condition = key.condition_key();
        let rank = clone_rank(key.clone.as_str());
        match controls.get(&condition) {
            Some(&current) if clone_rank(curves[current].0.clone.as_str()) <= rank => {}
            _ => {
                controls.insert(condition, idx);
            }
        }
    }

    curves
        .iter()
        .map(|(key, model)| {
            let control_idx = controls[&key.condition_key()];
            let control = curves[control_idx].1.ok_or(CurveError::NotComparable)?;
            let model = model.ok_or(CurveError::NotComparable)?;
            antilog_ratio(control, model).map(Comparison::from_ratio)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(clone: &str, condition: &str) -> CurveKey {
        CurveKey {
            clone: clone.to_string(),
            source: "Carbon".to_string(),
            condition: condition.to_string(),
        }
    }

    #[test]
    fn identical_curves_are_equal() {
        let model = [0.1, 0.3, 0.8, 0.9];
        let cmp = Comparison::from_ratio(antilog_ratio(&model, &model).unwrap());
        assert_eq!(cmp.ratio, 1.0);
        assert_eq!(cmp.score, 0);
        assert_eq!(cmp.performance, Performance::Equal);
    }

    #[test]
    fn ratio_is_geometric_mean_of_pointwise_ratios() {
        let control = [0.2, 0.8];
        let clone = [0.1, 0.8];
        let r = antilog_ratio(&control, &clone).unwrap();
        assert!((r - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn score_boundaries_are_exclusive() {
        assert_eq!(score(2.5), -4);
        assert_eq!(score(2.0), -3);
        assert_eq!(score(1.8), -3);
        assert_eq!(score(1.6), -2);
        assert_eq!(score(1.3), -1);
        assert_eq!(score(1.0), 0);
        assert_eq!(score(0.875), 1);
        assert_eq!(score(0.7), 2);
        assert_eq!(score(0.6), 3);
        assert_eq!(score(0.5), 4);
        assert_eq!(score(0.1), 4);
    }

    #[test]
    fn labels_follow_score_bands() {
        assert_eq!(performance(-4), Performance::Worst);
        assert_eq!(performance(-2), Performance::Worst);
        assert_eq!(performance(-1), Performance::Equal);
        assert_eq!(performance(1), Performance::Equal);
        assert_eq!(performance(2), Performance::Better);
        assert_eq!(performance(4), Performance::Better);
    }

    #[test]
    fn non_positive_model_value_is_rejected() {
        assert_eq!(
            antilog_ratio(&[0.1, 0.2], &[0.1, 0.0]),
            Err(CurveError::NonPositiveOd { index: 1, value: 0.0 })
        );
    }

    #[test]
    fn control_is_first_clone_of_each_condition() {
        let wt = [0.2, 0.4];
        let m1 = [0.1, 0.2];
        let clones = vec!["WT".to_string(), "M1".to_string()];
        // M1 appears first in the Fru group but WT still controls it.
        let curves = vec![
            (key("WT", "Glc"), Some(&wt[..])),
            (key("M1", "Glc"), Some(&m1[..])),
            (key("M1", "Fru"), Some(&m1[..])),
            (key("WT", "Fru"), Some(&wt[..])),
        ];
        let out = compare_groups(&curves, &clones);
        assert_eq!(out[0].as_ref().unwrap().ratio, 1.0);
        assert!((out[1].as_ref().unwrap().ratio - 2.0).abs() < 1e-12);
        assert!((out[2].as_ref().unwrap().ratio - 2.0).abs() < 1e-12);
        assert_eq!(out[3].as_ref().unwrap().score, 0);
    }

    #[test]
    fn missing_control_makes_group_not_comparable() {
        let m1 = [0.1, 0.2];
        let clones = vec!["WT".to_string(), "M1".to_string()];
        let curves = vec![(key("WT", "Glc"), None), (key("M1", "Glc"), Some(&m1[..]))];
        let out = compare_groups(&curves, &clones);
        assert_eq!(out[0], Err(CurveError::NotComparable));
        assert_eq!(out[1], Err(CurveError::NotComparable));
    }
}
