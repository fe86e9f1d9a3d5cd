//! Tab-separated report files.
//!
//! Every report is written into the output directory with a fixed name so
//! downstream scripts can pick them up. Undefined values are written as `NA`.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use crate::app::pipeline::{AnalysisOutput, CurveResult};
use crate::compare::LowerTriangle;
use crate::data::SyntheticPlate;
use crate::domain::{AnalysisConfig, FilterCategory, OutputSpec};
use crate::error::AppError;

pub const COMPARISONS_FILE: &str = "comparisons.txt";
pub const CLASSIFICATIONS_FILE: &str = "classifications.txt";
pub const DICE_FILE: &str = "dice_similarity.txt";
pub const PEARSON_FILE: &str = "pearson_similarity.txt";
pub const MEDIAN_FILE: &str = "replicate_median.txt";
pub const MODEL_FILE: &str = "logistic_model.txt";
pub const MODEL_VS_DATA_FILE: &str = "model_x_realdata.txt";
pub const FILTER_FILE: &str = "filter_info.txt";

const NA: &str = "NA";

/// Write every report for one run and return the paths written.
pub fn write_reports(
    out: &OutputSpec,
    analysis: &AnalysisOutput,
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(&out.dir).map_err(|e| {
        AppError::new(2, format!("Failed to create output directory '{}': {e}", out.dir.display()))
    })?;

    let mut written = Vec::new();
    emit(&out.dir, COMPARISONS_FILE, &mut written, |p| write_comparisons(p, analysis))?;
    emit(&out.dir, CLASSIFICATIONS_FILE, &mut written, |p| write_classifications(p, analysis))?;
    emit(&out.dir, DICE_FILE, &mut written, |p| write_triangle(p, &analysis.dice))?;
    emit(&out.dir, PEARSON_FILE, &mut written, |p| write_triangle(p, &analysis.pearson))?;
    emit(&out.dir, MEDIAN_FILE, &mut written, |p| write_replicate_median(p, analysis))?;
    emit(&out.dir, MODEL_FILE, &mut written, |p| write_logistic_model(p, analysis))?;
    emit(&out.dir, MODEL_VS_DATA_FILE, &mut written, |p| write_model_vs_data(p, analysis))?;
    if config.filter {
        emit(&out.dir, FILTER_FILE, &mut written, |p| write_filter_info(p, analysis))?;
    }

    let summary = out.dir.join(format!("{}_summary.json", out.prefix));
    crate::io::summary::write_summary_json(&summary, analysis, config)?;
    written.push(summary);

    Ok(written)
}

/// One row per aggregated curve: fitted parameters and the control comparison.
pub fn write_comparisons(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(
        &mut w,
        [
            "clone",
            "mainsource",
            "growthcondition",
            "well",
            "lagphase",
            "maximumgrowthrate",
            "asymptote",
            "modelstdev",
            "ratio",
            "score",
            "predictedperformance",
        ],
    )?;

    for c in &analysis.curves {
        let key = &c.curve.key;
        let fit = c.fit.as_ref().ok();
        let cmp = c.comparison.as_ref().ok();
        write_row(
            &mut w,
            [
                key.clone.clone(),
                key.source.clone(),
                key.condition.clone(),
                c.curve.well.clone(),
                fmt_opt(fit.map(|f| f.lag), 1),
                fmt_opt(fit.map(|f| f.params.max_growth_rate), 4),
                fmt_opt(fit.map(|f| f.params.asymptote), 4),
                fmt_opt(fit.map(|f| f.residual), 4),
                fmt_opt(cmp.map(|k| k.ratio), 4),
                cmp.map(|k| k.score.to_string()).unwrap_or_else(|| NA.to_string()),
                cmp.map(|k| k.performance.label().to_string()).unwrap_or_else(|| NA.to_string()),
            ],
        )?;
    }
    finish(w, path)
}

/// Harmonic means and classes, grouped by clone.
pub fn write_classifications(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(
        &mut w,
        [
            "clone",
            "mainsource",
            "growthcondition",
            "well",
            "harmonicmean",
            "growthclass",
            "mean_no_asymptote",
            "growthclass_no_asymptote",
        ],
    )?;

    for clone in &analysis.clones {
        for c in analysis.curves.iter().filter(|c| &c.curve.key.clone == clone) {
            let key = &c.curve.key;
            let (adjusted, plain) = (c.adjusted(), c.plain());
            write_row(
                &mut w,
                [
                    key.clone.clone(),
                    key.source.clone(),
                    key.condition.clone(),
                    c.curve.well.clone(),
                    fmt_opt(adjusted.map(|k| k.harmonic_mean), 4),
                    adjusted.map(|k| k.grade.label().to_string()).unwrap_or_else(|| NA.to_string()),
                    fmt_opt(plain.map(|k| k.harmonic_mean), 4),
                    plain.map(|k| k.grade.label().to_string()).unwrap_or_else(|| NA.to_string()),
                ],
            )?;
        }
    }
    finish(w, path)
}

/// Lower-triangular similarity matrix with clone labels.
pub fn write_triangle(path: &Path, m: &LowerTriangle) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    let header = std::iter::once(String::new()).chain(m.column_labels().iter().cloned());
    write_row(&mut w, header)?;
    for (label, row) in m.row_labels().iter().zip(&m.rows) {
        let cells = std::iter::once(label.clone()).chain(row.iter().map(|&v| fmt_num(v, 6)));
        write_row(&mut w, cells)?;
    }
    finish(w, path)
}

/// Median and stdev per curve, one row each, time along the columns.
pub fn write_replicate_median(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(&mut w, time_header(&analysis.time, 2))?;
    for c in &analysis.curves {
        let median = labelled(&c.curve.key.clone, "median", c.curve.median.iter().map(|&v| fmt_num(v, 6)));
        write_row(&mut w, median)?;
        let stdev = labelled(&c.curve.key.condition, "std_dev", c.curve.stdev.iter().map(|&v| fmt_num(v, 6)));
        write_row(&mut w, stdev)?;
    }
    finish(w, path)
}

/// Best logistic model per curve. Curves that could not be modeled get `NA`.
pub fn write_logistic_model(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(&mut w, time_header(&analysis.time, 2))?;
    for c in &analysis.curves {
        let cells = labelled(&c.curve.key.clone, &c.curve.well, model_cells(c, analysis.time.len()));
        write_row(&mut w, cells)?;
    }
    finish(w, path)
}

/// Aggregated data followed by its model, per curve.
pub fn write_model_vs_data(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(&mut w, time_header(&analysis.time, 2))?;
    for c in &analysis.curves {
        let real = labelled(&c.curve.key.clone, "realdata", c.curve.median.iter().map(|&v| fmt_num(v, 6)));
        write_row(&mut w, real)?;
        let model = labelled(&c.curve.key.condition, "logisticmodel", model_cells(c, analysis.time.len()));
        write_row(&mut w, model)?;
    }
    finish(w, path)
}

/// Filter category of every replicate, grouped by category.
pub fn write_filter_info(path: &Path, analysis: &AnalysisOutput) -> Result<(), AppError> {
    let mut w = tsv_writer(path)?;
    write_row(&mut w, ["clone", "mainsource", "substrate", "replicate", "filtergroup"])?;
    for category in FilterCategory::ALL {
        for r in analysis.filter_records.iter().filter(|r| r.category == category) {
            write_row(
                &mut w,
                [
                    r.key.clone.clone(),
                    r.key.source.clone(),
                    r.key.condition.clone(),
                    r.key.replicate.to_string(),
                    category.label().to_string(),
                ],
            )?;
        }
    }
    finish(w, path)
}

/// Write a synthetic plate in the ingest layout (4 header rows, then time rows).
pub fn write_plate_tsv(path: &Path, plate: &SyntheticPlate) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let mut w = tsv_writer(path)?;
    let header = |name: &str, field: &dyn Fn(usize) -> String| {
        std::iter::once(name.to_string())
            .chain((0..plate.wells.len()).map(field))
            .collect::<Vec<_>>()
    };
    write_row(&mut w, header("clone", &|i| plate.wells[i].key.clone.clone()))?;
    write_row(&mut w, header("source", &|i| plate.wells[i].key.source.clone()))?;
    write_row(&mut w, header("condition", &|i| plate.wells[i].key.condition.clone()))?;
    write_row(&mut w, header("well", &|i| plate.wells[i].label.clone()))?;
    for (s, t) in plate.time.iter().enumerate() {
        let cells = std::iter::once(t.to_string()).chain(plate.wells.iter().map(|well| format!("{:.4}", well.od[s])));
        write_row(&mut w, cells)?;
    }
    finish(w, path)
}

fn emit(
    dir: &Path,
    name: &str,
    written: &mut Vec<PathBuf>,
    write: impl FnOnce(&Path) -> Result<(), AppError>,
) -> Result<(), AppError> {
    let path = dir.join(name);
    write(&path)?;
    log::debug!("wrote {}", path.display());
    written.push(path);
    Ok(())
}

/// Two label cells followed by the values.
fn labelled(first: &str, second: &str, values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut row = vec![first.to_string(), second.to_string()];
    row.extend(values);
    row
}

fn model_cells(c: &CurveResult, n: usize) -> Vec<String> {
    match &c.fit {
        Ok(fit) => fit.model.iter().map(|&v| fmt_num(v, 6)).collect(),
        Err(_) => vec![NA.to_string(); n],
    }
}

/// `time` plus empty cells up to `label_cols`, then the time points.
fn time_header(time: &[f64], label_cols: usize) -> Vec<String> {
    let mut row = vec!["time".to_string()];
    row.extend(std::iter::repeat_n(String::new(), label_cols.saturating_sub(1)));
    row.extend(time.iter().map(|t| t.to_string()));
    row
}

fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{v:.decimals$}")
    } else {
        NA.to_string()
    }
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| fmt_num(v, decimals)).unwrap_or_else(|| NA.to_string())
}

fn tsv_writer(path: &Path) -> Result<Writer<fs::File>, AppError> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))
}

fn write_row<I, T>(w: &mut Writer<fs::File>, cells: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    w.write_record(cells)
        .map_err(|e| AppError::new(2, format!("Failed to write report row: {e}")))
}

fn finish(mut w: Writer<fs::File>, path: &Path) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))
}
