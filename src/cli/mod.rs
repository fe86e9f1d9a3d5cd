//! Command-line parsing for the growth-curve analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling code; `app` maps these structs onto `AnalysisConfig` /
//! `SimulationConfig`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::DEFAULT_WINDOW_SIZE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pmc", version, about = "Phenotype microarray growth-curve analyzer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Model every curve of a plate TSV and write the comparison reports.
    Analyze(AnalyzeArgs),
    /// Generate a synthetic plate TSV (seeded logistic curves plus noise).
    Simulate(SimulateArgs),
}

/// Options for `pmc analyze`.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Plate TSV (4 header rows: clone, source, condition, well).
    #[arg(short = 'i', long, value_name = "TSV")]
    pub input: PathBuf,

    /// Prefix for the JSON run summary.
    #[arg(short = 'o', long, default_value = "pmc")]
    pub prefix: String,

    /// Output directory (created if missing).
    #[arg(short = 'n', long = "outdir", value_name = "DIR", default_value = ".")]
    pub outdir: PathBuf,

    /// Drop misfit and no-growth replicates before aggregating.
    #[arg(short = 'f', long)]
    pub filter: bool,

    /// Weight the asymptote term of the harmonic mean by the max growth rate.
    #[arg(short = 'z', long = "weighted-hm")]
    pub weighted_hm: bool,

    /// Sliding-window size (samples) for the max growth rate; must be > 2.
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: usize,
}

/// Options for `pmc simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Output plate TSV.
    #[arg(short = 'o', long, value_name = "TSV")]
    pub output: PathBuf,

    /// Number of clones (the first one is the control).
    #[arg(long, default_value_t = 3)]
    pub clones: usize,

    /// Number of growth conditions.
    #[arg(long, default_value_t = 8)]
    pub conditions: usize,

    /// Replicates per clone and condition.
    #[arg(long, default_value_t = 3)]
    pub replicates: usize,

    /// Run length in hours.
    #[arg(long, default_value_t = 48.0)]
    pub hours: f64,

    /// Sampling interval in hours.
    #[arg(long, default_value_t = 0.5)]
    pub step: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the per-reading OD noise.
    #[arg(long, default_value_t = 0.005)]
    pub noise: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::parse_from(["pmc", "analyze", "-i", "plate.tsv", "-o", "run1", "-n", "out", "-f", "-z"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input, PathBuf::from("plate.tsv"));
        assert_eq!(args.prefix, "run1");
        assert_eq!(args.outdir, PathBuf::from("out"));
        assert!(args.filter);
        assert!(args.weighted_hm);
        assert_eq!(args.window, DEFAULT_WINDOW_SIZE);
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::parse_from(["pmc", "simulate", "-o", "plate.tsv", "--seed", "9"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.seed, 9);
        assert_eq!(args.clones, 3);
        assert_eq!(args.hours, 48.0);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["pmc", "analyze"]).is_err());
    }
}
