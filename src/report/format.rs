//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the modeling code stays clean and testable
//! - output changes are localized

use std::path::PathBuf;

use crate::app::pipeline::AnalysisOutput;
use crate::domain::AnalysisConfig;
use crate::report::{class_histograms, filter_tally, performance_tallies};

/// Format the run summary (plate shape, filter tallies, per-clone outcomes).
pub fn format_run_summary(analysis: &AnalysisOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();

    out.push_str("=== pmc - growth curve analysis ===\n");
    out.push_str(&format!(
        "Plate: {} clones x {} conditions | {} time points over {:.1} h\n",
        analysis.clones.len(),
        analysis.conditions.len(),
        analysis.time.len(),
        analysis.time.last().copied().unwrap_or(0.0),
    ));
    out.push_str(&format!(
        "Options: filter={} weighted_hm={} window={}\n",
        config.filter, config.weighted_harmonic_mean, config.window_size
    ));

    let modeled = analysis.modeled().count();
    out.push_str(&format!("Curves: {} total | {} modeled\n", analysis.curves.len(), modeled));

    if config.filter {
        let parts: Vec<String> = filter_tally(analysis)
            .iter()
            .map(|(c, n)| format!("{}={n}", c.label()))
            .collect();
        out.push_str(&format!("Filter: {}\n", parts.join(" ")));
    }

    out.push_str("\nPer clone:\n");
    out.push_str(
        format!(
            "{:<16} {:>4} {:>4} {:>4} {:>4} {:>4} | {:>6} {:>6} {:>6} {:>4}\n",
            "clone", "A", "B", "C", "D", "NA", "worst", "equal", "better", "NA"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<16} {:-<4} {:-<4} {:-<4} {:-<4} {:-<4} | {:-<6} {:-<6} {:-<6} {:-<4}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (h, (_, t)) in class_histograms(analysis).iter().zip(performance_tallies(analysis)) {
        out.push_str(
            format!(
                "{:<16} {:>4} {:>4} {:>4} {:>4} {:>4} | {:>6} {:>6} {:>6} {:>4}\n",
                truncate(&h.clone, 16),
                h.counts[0],
                h.counts[1],
                h.counts[2],
                h.counts[3],
                h.unclassified,
                t.worst,
                t.equal,
                t.better,
                t.not_comparable,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format_excluded(analysis));
    out
}

/// List curves excluded from scoring, then curves that were classified but
/// could not be compared with their control.
pub fn format_excluded(analysis: &AnalysisOutput) -> String {
    let mut out = String::new();

    let excluded: Vec<_> = analysis.excluded().collect();
    if !excluded.is_empty() {
        out.push_str(&format!("\nExcluded curves ({}):\n", excluded.len()));
        for c in excluded {
            if let Some(err) = c.exclusion() {
                out.push_str(&format!("- {} ({}): {err}\n", c.curve.key, c.curve.well));
            }
        }
    }

    let not_comparable: Vec<_> = analysis.not_comparable().collect();
    if !not_comparable.is_empty() {
        out.push_str(&format!("\nNot comparable with control ({}):\n", not_comparable.len()));
        for c in not_comparable {
            if let Some(err) = c.not_comparable() {
                out.push_str(&format!("- {} ({}): {err}\n", c.curve.key, c.curve.well));
            }
        }
    }
    out
}

/// List the files written by a run.
pub fn format_written(paths: &[PathBuf]) -> String {
    let mut out = String::from("\nWrote:\n");
    for p in paths {
        out.push_str(&format!("- {}\n", p.display()));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_analysis;
    use crate::data::generate_plate;
    use crate::domain::SimulationConfig;
    use crate::report::ClassHistogram;

    fn analysis(config: &AnalysisConfig) -> AnalysisOutput {
        let plate = generate_plate(&SimulationConfig {
            clones: 2,
            conditions: 3,
            replicates: 3,
            hours: 36.0,
            step: 0.5,
            seed: 5,
            noise: 0.002,
        })
        .unwrap();
        run_analysis(plate.to_dataset().unwrap(), config).unwrap()
    }

    #[test]
    fn summary_lists_every_clone() {
        let config = AnalysisConfig::default();
        let text = format_run_summary(&analysis(&config), &config);
        assert!(text.contains("Plate: 2 clones x 3 conditions"));
        assert!(text.lines().any(|l| l.starts_with("WT ")));
        assert!(text.lines().any(|l| l.starts_with("M1 ")));
        assert!(!text.contains("Filter:"));
    }

    #[test]
    fn filter_line_only_when_filtering() {
        let config = AnalysisConfig {
            filter: true,
            ..AnalysisConfig::default()
        };
        let text = format_run_summary(&analysis(&config), &config);
        assert!(text.contains("Filter: misfits="));
    }

    #[test]
    fn histogram_counts_every_curve_of_a_clone() {
        let out = analysis(&AnalysisConfig::default());
        let hist: Vec<ClassHistogram> = crate::report::class_histograms(&out);
        assert_eq!(hist.len(), 2);
        for h in hist {
            assert_eq!(h.counts.iter().sum::<usize>() + h.unclassified, 3);
        }
    }

    #[test]
    fn control_tally_is_all_equal() {
        let out = analysis(&AnalysisConfig::default());
        let tallies = crate::report::performance_tallies(&out);
        assert_eq!(tallies[0].0, "WT");
        assert_eq!(tallies[0].1.equal, 3);
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("short", 16), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd.");
    }
}
