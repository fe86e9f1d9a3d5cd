//! Synthetic plate generation.
//!
//! Every `(clone, condition)` pair draws its own logistic parameters from a
//! seeded RNG; each replicate is that curve plus Gaussian reading noise.
//! Columns are laid out condition → clone → replicate, the same way a plate
//! export groups them, and wells are labelled `A1..H12` cycling over a
//! 96-well plate.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::DataSet;
use crate::domain::{CurveKey, SimulationConfig, WellKey};
use crate::error::AppError;
use crate::models::{LogisticParams, predict};

/// Readings never go below this (plate reader floor).
const MIN_OD: f64 = 0.01;
const PLATE_ROWS: usize = 8;
const PLATE_COLS: usize = 12;

const SOURCES: [&str; 2] = ["Carbon", "Nitrogen"];

/// One simulated well column.
#[derive(Debug, Clone)]
pub struct SyntheticWell {
    pub key: WellKey,
    pub label: String,
    pub od: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SyntheticPlate {
    pub time: Vec<f64>,
    pub wells: Vec<SyntheticWell>,
    /// Parameters each group was generated from, in generation order.
    pub truth: Vec<(CurveKey, LogisticParams)>,
}

impl SyntheticPlate {
    pub fn to_dataset(&self) -> Result<DataSet, AppError> {
        let mut dataset = DataSet::new(self.time.clone())?;
        for w in &self.wells {
            dataset.push_well(w.key.clone(), w.label.clone(), w.od.clone())?;
        }
        Ok(dataset)
    }
}

/// Clone names: a control followed by numbered mutants.
pub fn clone_name(index: usize) -> String {
    if index == 0 {
        "WT".to_string()
    } else {
        format!("M{index}")
    }
}

/// Plate position for the `index`-th column (`A1`, `A2`, … `H12`, `A1`, …).
pub fn well_label(index: usize) -> String {
    let pos = index % (PLATE_ROWS * PLATE_COLS);
    let row = (b'A' + (pos / PLATE_COLS) as u8) as char;
    format!("{row}{}", pos % PLATE_COLS + 1)
}

pub fn generate_plate(config: &SimulationConfig) -> Result<SyntheticPlate, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let n_samples = (config.hours / config.step).floor() as usize + 1;
    let time: Vec<f64> = (0..n_samples).map(|i| i as f64 * config.step).collect();

    let mut wells = Vec::with_capacity(config.conditions * config.clones * config.replicates);
    let mut truth = Vec::with_capacity(config.conditions * config.clones);

    for c in 0..config.conditions {
        let source = SOURCES[c % SOURCES.len()].to_string();
        let condition = format!("S{:02}", c + 1);

        for k in 0..config.clones {
            let curve = CurveKey {
                clone: clone_name(k),
                source: source.clone(),
                condition: condition.clone(),
            };
            let params = LogisticParams {
                p2: rng.gen_range(0.05..0.10),
                asymptote: rng.gen_range(0.3..1.0),
                max_growth_rate: rng.gen_range(0.2..0.5),
                lag: rng.gen_range(5.0..14.0),
            };

            for r in 0..config.replicates {
                let od = time
                    .iter()
                    .map(|&t| (predict(&params, t) + rng.sample(noise)).max(MIN_OD))
                    .collect();
                wells.push(SyntheticWell {
                    key: WellKey {
                        clone: curve.clone.clone(),
                        source: curve.source.clone(),
                        condition: curve.condition.clone(),
                        replicate: r + 1,
                    },
                    label: well_label(wells.len()),
                    od,
                });
            }
            truth.push((curve, params));
        }
    }

    log::debug!(
        "simulated {} wells over {} time points (seed {})",
        wells.len(),
        time.len(),
        config.seed
    );

    Ok(SyntheticPlate { time, wells, truth })
}
