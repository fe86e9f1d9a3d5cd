//! JSON run summary.
//!
//! A machine-readable companion to the TSV reports:
//! - run metadata (tool version, timestamp, configuration)
//! - plate shape and filter tallies
//! - per-curve parameters, comparison and classes (or the error that excluded
//!   the curve)

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::{AnalysisOutput, CurveResult};
use crate::domain::{AnalysisConfig, CurveKey, FilterCategory, Grade, Performance};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub generated_at: String,
    pub config: AnalysisConfig,
    pub n_samples: usize,
    pub duration_hours: f64,
    pub clones: Vec<String>,
    pub conditions: usize,
    pub curves_total: usize,
    pub curves_modeled: usize,
    pub curves_excluded: usize,
    /// Classified curves whose control could not be used.
    pub curves_not_comparable: usize,
    /// Replicates per filter category; empty when filtering is disabled.
    pub filter_counts: BTreeMap<String, usize>,
    pub curves: Vec<CurveSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveSummary {
    pub key: CurveKey,
    pub well: String,
    pub replicates_used: usize,
    pub replicates_total: usize,
    pub lag: Option<f64>,
    pub max_growth_rate: Option<f64>,
    pub asymptote: Option<f64>,
    pub residual: Option<f64>,
    pub ratio: Option<f64>,
    pub score: Option<i8>,
    pub performance: Option<Performance>,
    pub grade: Option<Grade>,
    pub plain_grade: Option<Grade>,
    pub error: Option<String>,
}

impl CurveSummary {
    fn from_result(c: &CurveResult) -> Self {
        let fit = c.fit.as_ref().ok();
        let cmp = c.comparison.as_ref().ok();
        Self {
            key: c.curve.key.clone(),
            well: c.curve.well.clone(),
            replicates_used: c.curve.replicates_used,
            replicates_total: c.curve.replicates_total,
            lag: fit.map(|f| f.lag),
            max_growth_rate: fit.map(|f| f.params.max_growth_rate),
            asymptote: fit.map(|f| f.params.asymptote),
            residual: fit.map(|f| f.residual),
            ratio: cmp.map(|k| k.ratio),
            score: cmp.map(|k| k.score),
            performance: cmp.map(|k| k.performance),
            grade: c.adjusted().map(|k| k.grade),
            plain_grade: c.plain().map(|k| k.grade),
            error: c.error().map(|e| e.to_string()),
        }
    }
}

pub fn build_summary(analysis: &AnalysisOutput, config: &AnalysisConfig) -> RunSummary {
    let mut filter_counts = BTreeMap::new();
    if !analysis.filter_records.is_empty() {
        for category in FilterCategory::ALL {
            let n = analysis
                .filter_records
                .iter()
                .filter(|r| r.category == category)
                .count();
            filter_counts.insert(category.label().to_string(), n);
        }
    }

    let curves_modeled = analysis.modeled().count();
    RunSummary {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: chrono::Local::now().to_rfc3339(),
        config: config.clone(),
        n_samples: analysis.time.len(),
        duration_hours: analysis.time.last().copied().unwrap_or(0.0),
        clones: analysis.clones.clone(),
        conditions: analysis.conditions.len(),
        curves_total: analysis.curves.len(),
        curves_modeled,
        curves_excluded: analysis.excluded().count(),
        curves_not_comparable: analysis.not_comparable().count(),
        filter_counts,
        curves: analysis.curves.iter().map(CurveSummary::from_result).collect(),
    }
}

pub fn write_summary_json(path: &Path, analysis: &AnalysisOutput, config: &AnalysisConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let summary = build_summary(analysis, config);
    serde_json::to_writer_pretty(file, &summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}
