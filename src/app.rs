//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the plate (or generates a synthetic one)
//! - runs the analysis pipeline
//! - prints the summary and writes the reports

use clap::Parser;

use crate::cli::{AnalyzeArgs, Command, SimulateArgs};
use crate::domain::{AnalysisConfig, OutputSpec, SimulationConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `pmc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    config.validate()?;

    log::info!("reading {}", args.input.display());
    let dataset = crate::io::ingest::load_dataset(&args.input)?;
    let analysis = pipeline::run_analysis(dataset, &config)?;

    println!("{}", crate::report::format_run_summary(&analysis, &config));

    let out = OutputSpec {
        dir: args.outdir.clone(),
        prefix: args.prefix.clone(),
    };
    let written = crate::io::export::write_reports(&out, &analysis, &config)?;
    println!("{}", crate::report::format_written(&written));

    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = simulation_config_from_args(&args);
    let plate = crate::data::generate_plate(&config)?;
    crate::io::export::write_plate_tsv(&args.output, &plate)?;

    log::info!(
        "wrote {} wells x {} time points to {}",
        plate.wells.len(),
        plate.time.len(),
        args.output.display()
    );
    Ok(())
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> AnalysisConfig {
    AnalysisConfig {
        filter: args.filter,
        weighted_harmonic_mean: args.weighted_hm,
        window_size: args.window,
    }
}

pub fn simulation_config_from_args(args: &SimulateArgs) -> SimulationConfig {
    SimulationConfig {
        clones: args.clones,
        conditions: args.conditions,
        replicates: args.replicates,
        hours: args.hours,
        step: args.step,
        seed: args.seed,
        noise: args.noise,
    }
}
