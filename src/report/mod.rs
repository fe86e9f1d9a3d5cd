//! Reporting utilities: tallies over an analysis run and terminal output.

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{FilterCategory, Grade, Performance};

pub mod format;

pub use format::*;

/// Growth-class histogram of one clone (adjusted scale, A..D).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHistogram {
    pub clone: String,
    /// Counts indexed by `Grade::rank()`.
    pub counts: [usize; 4],
    pub unclassified: usize,
}

/// Comparison outcome tally of one clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceTally {
    pub worst: usize,
    pub equal: usize,
    pub better: usize,
    pub not_comparable: usize,
}

/// Replicates per filter category, in category order.
pub fn filter_tally(analysis: &AnalysisOutput) -> Vec<(FilterCategory, usize)> {
    FilterCategory::ALL
        .iter()
        .map(|&c| {
            let n = analysis.filter_records.iter().filter(|r| r.category == c).count();
            (c, n)
        })
        .collect()
}

/// Class histogram per clone, in clone order.
pub fn class_histograms(analysis: &AnalysisOutput) -> Vec<ClassHistogram> {
    analysis
        .clones
        .iter()
        .map(|clone| {
            let mut counts = [0usize; 4];
            let mut unclassified = 0;
            for c in analysis.curves.iter().filter(|c| &c.curve.key.clone == clone) {
                match c.adjusted().map(|k| k.grade) {
                    Some(g) if g <= Grade::D => counts[g.rank()] += 1,
                    _ => unclassified += 1,
                }
            }
            ClassHistogram {
                clone: clone.clone(),
                counts,
                unclassified,
            }
        })
        .collect()
}

/// Performance tally per clone, in clone order.
pub fn performance_tallies(analysis: &AnalysisOutput) -> Vec<(String, PerformanceTally)> {
    analysis
        .clones
        .iter()
        .map(|clone| {
            let mut tally = PerformanceTally::default();
            for c in analysis.curves.iter().filter(|c| &c.curve.key.clone == clone) {
                match c.comparison.as_ref().map(|k| k.performance) {
                    Ok(Performance::Worst) => tally.worst += 1,
                    Ok(Performance::Equal) => tally.equal += 1,
                    Ok(Performance::Better) => tally.better += 1,
                    Err(_) => tally.not_comparable += 1,
                }
            }
            (clone.clone(), tally)
        })
        .collect()
}
