//! Replicate aggregation: per-timepoint median and standard deviation across
//! the non-filtered replicates of each `(clone, source, condition)` group.

use serde::Serialize;

use crate::data::DataSet;
use crate::domain::CurveKey;
use crate::math::{median_mut, population_stdev};

/// Median curve of one replicate group.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedCurve {
    pub key: CurveKey,
    /// Well label of the first replicate.
    pub well: String,
    pub median: Vec<f64>,
    pub stdev: Vec<f64>,
    /// Replicates that survived filtering.
    pub replicates_used: usize,
    pub replicates_total: usize,
}

impl AggregatedCurve {
    /// A curve with any undefined reading cannot be modeled or compared.
    pub fn is_comparable(&self) -> bool {
        !self.median.is_empty() && self.median.iter().all(|v| v.is_finite())
    }
}

/// Median and population stdev per timepoint. Both are NaN at every
/// timepoint when `replicates` is empty.
pub fn aggregate_replicates(replicates: &[&[f64]], n_samples: usize) -> (Vec<f64>, Vec<f64>) {
    let mut median = Vec::with_capacity(n_samples);
    let mut stdev = Vec::with_capacity(n_samples);
    let mut column = Vec::with_capacity(replicates.len());

    for i in 0..n_samples {
        column.clear();
        column.extend(replicates.iter().filter_map(|r| r.get(i).copied()));
        let sd = population_stdev(&column).unwrap_or(f64::NAN);
        let med = median_mut(&mut column).unwrap_or(f64::NAN);
        median.push(med);
        stdev.push(sd);
    }

    (median, stdev)
}

/// Aggregate every replicate group of the dataset, in order of first
/// appearance.
pub fn aggregate_dataset(dataset: &DataSet) -> Vec<AggregatedCurve> {
    let n = dataset.n_samples();
    dataset
        .curve_keys()
        .iter()
        .map(|key| {
            let all: Vec<_> = dataset.replicates(key).collect();
            let kept: Vec<&[f64]> = all
                .iter()
                .filter(|w| !w.filtered)
                .map(|w| w.od.as_slice())
                .collect();
            let (median, stdev) = aggregate_replicates(&kept, n);

            if kept.is_empty() {
                log::warn!("{key}: every replicate was filtered; curve is not comparable");
            }

            AggregatedCurve {
                key: key.clone(),
                well: all.first().map(|w| w.label.clone()).unwrap_or_default(),
                median,
                stdev,
                replicates_used: kept.len(),
                replicates_total: all.len(),
            }
        })
        .collect()
}
