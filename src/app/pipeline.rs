//! The analysis workflow shared by the CLI and the integration tests:
//! filter → aggregate → extract → fit → compare → classify → similarity.
//!
//! Per-curve numeric failures are recorded on the curve and never abort the
//! run, even when no curve can be modeled; only a plate without wells is
//! fatal.

use rayon::prelude::*;

use crate::compare::{
    Classification, Comparison, GradedMean, LowerTriangle, classify, compare_groups, dice_matrix,
    pearson_matrix,
};
use crate::data::{AggregatedCurve, DataSet, FilterRecord, aggregate_dataset, apply_filter};
use crate::domain::{AnalysisConfig, ConditionKey, GradeScale};
use crate::error::{AppError, CurveError};
use crate::fit::{CurveFit, fit_curve, probe_grid_for};

/// Everything computed for one aggregated curve.
#[derive(Debug, Clone)]
pub struct CurveResult {
    pub curve: AggregatedCurve,
    pub fit: Result<CurveFit, CurveError>,
    pub comparison: Result<Comparison, CurveError>,
    pub classification: Result<Classification, CurveError>,
}

impl CurveResult {
    /// Adjusted grade, the one used for similarity.
    pub fn adjusted(&self) -> Option<&GradedMean> {
        self.classification.as_ref().ok().and_then(|c| c.adjusted.as_ref().ok())
    }

    pub fn plain(&self) -> Option<&GradedMean> {
        self.classification.as_ref().ok().and_then(|c| c.plain.as_ref().ok())
    }

    /// Error that kept this curve out of classification and similarity.
    pub fn exclusion(&self) -> Option<&CurveError> {
        match &self.classification {
            Ok(c) => c.adjusted.as_ref().err(),
            Err(err) => Some(self.fit.as_ref().err().unwrap_or(err)),
        }
    }

    /// Error that stopped the comparison with the control, for curves that
    /// were otherwise modeled and classified.
    pub fn not_comparable(&self) -> Option<&CurveError> {
        match self.exclusion() {
            Some(_) => None,
            None => self.comparison.as_ref().err(),
        }
    }

    /// First error hit by this curve, if any stage failed.
    pub fn error(&self) -> Option<&CurveError> {
        self.exclusion()
            .or(self.comparison.as_ref().err())
            .or(self.classification.as_ref().ok().and_then(|c| c.plain.as_ref().err()))
    }
}

/// All outputs of one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub time: Vec<f64>,
    pub clones: Vec<String>,
    pub conditions: Vec<ConditionKey>,
    /// Filter decisions per replicate; empty when filtering is disabled.
    pub filter_records: Vec<FilterRecord>,
    pub curves: Vec<CurveResult>,
    pub dice: LowerTriangle,
    pub pearson: LowerTriangle,
}

impl AnalysisOutput {
    pub fn modeled(&self) -> impl Iterator<Item = &CurveFit> {
        self.curves.iter().filter_map(|c| c.fit.as_ref().ok())
    }

    pub fn excluded(&self) -> impl Iterator<Item = &CurveResult> {
        self.curves.iter().filter(|c| c.exclusion().is_some())
    }

    pub fn not_comparable(&self) -> impl Iterator<Item = &CurveResult> {
        self.curves.iter().filter(|c| c.not_comparable().is_some())
    }
}

/// Run the full analysis on a parsed dataset.
pub fn run_analysis(mut dataset: DataSet, config: &AnalysisConfig) -> Result<AnalysisOutput, AppError> {
    config.validate()?;
    if dataset.wells().is_empty() {
        return Err(AppError::new(3, "Plate has no wells; nothing to analyze."));
    }

    let filter_records = if config.filter {
        log::info!("step 1/7: filtering {} replicate curves", dataset.wells().len());
        let records = apply_filter(&mut dataset);
        let dropped = records.iter().filter(|r| r.category.is_filtered()).count();
        log::info!("filtered out {dropped} replicates");
        records
    } else {
        log::info!("step 1/7: filtering disabled");
        Vec::new()
    };

    log::info!("step 2/7: aggregating replicates");
    let aggregated = aggregate_dataset(&dataset);

    log::info!("step 3/7: fitting {} logistic models", aggregated.len());
    let time = dataset.time().to_vec();
    let probes = probe_grid_for(&time)?;
    let fits: Vec<Result<CurveFit, CurveError>> = aggregated
        .par_iter()
        .map(|curve| fit_curve(curve, &time, &probes, config.window_size))
        .collect();

    if fits.iter().all(|f| f.is_err()) {
        log::warn!("no curve could be modeled; every report row will be NA");
    }

    log::info!("step 4/7: comparing clones with the control of each condition");
    let keyed: Vec<_> = aggregated
        .iter()
        .zip(&fits)
        .map(|(curve, fit)| (curve.key.clone(), fit.as_ref().ok().map(|f| f.model.as_slice())))
        .collect();
    let comparisons = compare_groups(&keyed, dataset.clones());

    log::info!("step 5/7: classifying growth levels");
    let classifications: Vec<Result<Classification, CurveError>> = fits
        .iter()
        .map(|fit| match fit {
            Ok(f) => Ok(classify(f, config.weighted_harmonic_mean)),
            Err(_) => Err(CurveError::NotComparable),
        })
        .collect();

    let curves: Vec<CurveResult> = aggregated
        .into_iter()
        .zip(fits)
        .zip(comparisons)
        .zip(classifications)
        .map(|(((curve, fit), comparison), classification)| CurveResult {
            curve,
            fit,
            comparison,
            classification,
        })
        .collect();

    for c in &curves {
        if let Some(err) = c.exclusion() {
            log::warn!("{} ({}): excluded: {err}", c.curve.key, c.curve.well);
        } else if let Some(err) = c.not_comparable() {
            log::warn!("{} ({}): not compared with control: {err}", c.curve.key, c.curve.well);
        }
    }

    let clones = dataset.clones().to_vec();
    let conditions = dataset.conditions().to_vec();

    log::info!("step 6/7: dice similarity over {} clones", clones.len());
    let grades: Vec<Vec<_>> = profiles(&curves, &clones, &conditions, |c| c.grade);
    let dice = dice_matrix(&clones, &grades, GradeScale::Four);

    log::info!("step 7/7: pearson similarity over {} clones", clones.len());
    let means: Vec<Vec<_>> = profiles(&curves, &clones, &conditions, |c| c.harmonic_mean);
    let pearson = pearson_matrix(&clones, &means);

    Ok(AnalysisOutput {
        time,
        clones,
        conditions,
        filter_records,
        curves,
        dice,
        pearson,
    })
}

/// Per-clone vectors aligned to `conditions`, `None` where the clone has no
/// classified curve in that condition.
fn profiles<T>(
    curves: &[CurveResult],
    clones: &[String],
    conditions: &[ConditionKey],
    value: impl Fn(&GradedMean) -> T,
) -> Vec<Vec<Option<T>>> {
    clones
        .iter()
        .map(|clone| {
            conditions
                .iter()
                .map(|cond| {
                    curves
                        .iter()
                        .find(|c| &c.curve.key.clone == clone && &c.curve.key.condition_key() == cond)
                        .and_then(CurveResult::adjusted)
                        .map(&value)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SyntheticPlate, generate_plate};
    use crate::domain::{Performance, SimulationConfig};

    fn plate() -> SyntheticPlate {
        generate_plate(&SimulationConfig {
            clones: 3,
            conditions: 4,
            replicates: 3,
            hours: 48.0,
            step: 0.5,
            seed: 11,
            noise: 0.002,
        })
        .unwrap()
    }

    #[test]
    fn every_curve_gets_a_result_in_input_order() {
        let ds = plate().to_dataset().unwrap();
        let keys = ds.curve_keys().to_vec();
        let out = run_analysis(ds, &AnalysisConfig::default()).unwrap();

        assert_eq!(out.curves.len(), 12);
        let got: Vec<_> = out.curves.iter().map(|c| c.curve.key.clone()).collect();
        assert_eq!(got, keys);
        assert!(out.filter_records.is_empty());
        assert_eq!(out.dice.rows.len(), 2);
        assert_eq!(out.pearson.rows.len(), 2);
    }

    #[test]
    fn control_compares_equal_to_itself() {
        let out = run_analysis(plate().to_dataset().unwrap(), &AnalysisConfig::default()).unwrap();
        for c in out.curves.iter().filter(|c| c.curve.key.clone == "WT") {
            let cmp = c.comparison.as_ref().unwrap();
            assert_eq!(cmp.ratio, 1.0);
            assert_eq!(cmp.performance, Performance::Equal);
        }
    }

    #[test]
    fn filtering_records_every_replicate() {
        let config = AnalysisConfig {
            filter: true,
            ..AnalysisConfig::default()
        };
        let out = run_analysis(plate().to_dataset().unwrap(), &config).unwrap();
        assert_eq!(out.filter_records.len(), 36);
    }

    #[test]
    fn weighting_changes_harmonic_mean_only() {
        let ds = plate().to_dataset().unwrap();
        let plain = run_analysis(ds.clone(), &AnalysisConfig::default()).unwrap();
        let weighted = run_analysis(
            ds,
            &AnalysisConfig {
                weighted_harmonic_mean: true,
                ..AnalysisConfig::default()
            },
        )
        .unwrap();

        let a = &plain.curves[0];
        let b = &weighted.curves[0];
        assert_ne!(a.adjusted().unwrap().harmonic_mean, b.adjusted().unwrap().harmonic_mean);
        assert_eq!(a.plain(), b.plain());
        assert_eq!(plain.curves[0].fit.as_ref().unwrap().lag, weighted.curves[0].fit.as_ref().unwrap().lag);
    }

    fn well_key(clone: &str, condition: &str) -> crate::domain::WellKey {
        crate::domain::WellKey {
            clone: clone.to_string(),
            source: "Carbon".to_string(),
            condition: condition.to_string(),
            replicate: 1,
        }
    }

    #[test]
    fn fully_filtered_plate_still_reports() {
        let mut ds = DataSet::new((0..20).map(|i| i as f64 * 0.5).collect()).unwrap();
        // Starts far above the misfit threshold.
        ds.push_well(well_key("WT", "Glc"), "A1", vec![0.5; 20]).unwrap();
        let config = AnalysisConfig {
            filter: true,
            ..AnalysisConfig::default()
        };
        let out = run_analysis(ds, &config).unwrap();
        assert_eq!(out.modeled().count(), 0);
        assert_eq!(out.excluded().count(), 1);
        assert_eq!(out.curves[0].exclusion(), Some(&CurveError::NotComparable));
    }

    #[test]
    fn empty_plate_is_fatal() {
        let ds = DataSet::new((0..20).map(|i| i as f64 * 0.5).collect()).unwrap();
        let err = run_analysis(ds, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_control_is_not_comparable_rather_than_excluded() {
        let base = plate();
        let mut ds = DataSet::new(base.time.clone()).unwrap();
        for w in base.wells.iter().filter(|w| w.key.condition == "S01") {
            let mut od = w.od.clone();
            if w.key.clone == "WT" {
                od[0] = 0.5;
            }
            ds.push_well(w.key.clone(), w.label.clone(), od).unwrap();
        }
        let config = AnalysisConfig {
            filter: true,
            ..AnalysisConfig::default()
        };
        let out = run_analysis(ds, &config).unwrap();

        let wt = &out.curves[0];
        assert_eq!(wt.curve.key.clone, "WT");
        assert!(wt.exclusion().is_some());

        let m1 = out.curves.iter().find(|c| c.curve.key.clone == "M1").unwrap();
        assert!(m1.fit.is_ok());
        assert!(m1.adjusted().is_some());
        assert_eq!(m1.exclusion(), None);
        assert_eq!(m1.not_comparable(), Some(&CurveError::NotComparable));

        assert_eq!(out.excluded().count(), 1);
        assert_eq!(out.not_comparable().count(), 2);
    }

    #[test]
    fn self_similarity_matches_identical_profiles() {
        // Two clones with identical data share every class.
        let base = plate();
        let mut ds = DataSet::new(base.time.clone()).unwrap();
        for w in base.wells.iter().filter(|w| w.key.clone == "WT") {
            ds.push_well(w.key.clone(), w.label.clone(), w.od.clone()).unwrap();
            let mut twin = w.key.clone();
            twin.clone = "TWIN".to_string();
            ds.push_well(twin, w.label.clone(), w.od.clone()).unwrap();
        }
        let out = run_analysis(ds, &AnalysisConfig::default()).unwrap();
        assert_eq!(out.dice.get(0, 1), Some(1.0));
        assert!(out.pearson.get(0, 1).unwrap().abs() < 1e-9);
        assert!(out.curves.iter().all(|c| c.adjusted().is_some() && c.plain().is_some()));
        let twin = out.curves.iter().find(|c| c.curve.key.clone == "TWIN").unwrap();
        assert_eq!(twin.comparison.as_ref().unwrap().ratio, 1.0);
    }
}
