//! TSV ingest.
//!
//! Layout (tab-separated, first column is a row label):
//!
//! ```text
//! clone      WT      WT      WT      M1   ...
//! source     Carbon  Carbon  Carbon  Carbon
//! condition  Glc     Glc     Glc     Glc
//! well       A1      A1      A1      A1
//! 0.0        0.09    0.10    0.09    0.11
//! 0.5        ...
//! ```
//!
//! Columns sharing `(clone, source, condition)` are replicates of one group,
//! numbered 1, 2, … in column order. Any structural problem (ragged rows,
//! non-numeric readings, non-increasing time) is fatal with exit code 2.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::data::DataSet;
use crate::domain::WellKey;
use crate::error::AppError;

/// Number of header rows preceding the time series.
pub const HEADER_ROWS: usize = 4;

/// Load a plate TSV from disk.
pub fn load_dataset(path: &Path) -> Result<DataSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input TSV '{}': {e}", path.display())))?;
    read_dataset(file)
}

/// Parse a plate TSV from any reader.
pub fn read_dataset<R: Read>(reader: R) -> Result<DataSet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records: Vec<StringRecord> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("TSV parse error on line {}: {e}", idx + 1)))?;
        // Skip fully blank lines (e.g. a trailing newline).
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        records.push(record);
    }

    if records.len() <= HEADER_ROWS {
        return Err(AppError::new(
            2,
            format!(
                "Input needs {HEADER_ROWS} header rows and at least one time point (found {} rows).",
                records.len()
            ),
        ));
    }

    let width = records[0].len();
    if width < 2 {
        return Err(AppError::new(2, "Input has no well columns."));
    }
    for (idx, record) in records.iter().enumerate() {
        if record.len() != width {
            return Err(AppError::new(
                2,
                format!(
                    "Row {} has {} columns, expected {width} (same as the clone header).",
                    idx + 1,
                    record.len()
                ),
            ));
        }
    }

    let clones = header_fields(&records[0]);
    let sources = header_fields(&records[1]);
    let conditions = header_fields(&records[2]);
    let labels = header_fields(&records[3]);

    let n_wells = width - 1;
    let mut time = Vec::with_capacity(records.len() - HEADER_ROWS);
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(records.len() - HEADER_ROWS); n_wells];

    for (offset, record) in records[HEADER_ROWS..].iter().enumerate() {
        let line = HEADER_ROWS + offset + 1;
        time.push(parse_value(record.get(0), line, 1)?);
        for (col, values) in columns.iter_mut().enumerate() {
            values.push(parse_value(record.get(col + 1), line, col + 2)?);
        }
    }

    let mut dataset = DataSet::new(time)?;
    for (col, od) in columns.into_iter().enumerate() {
        let curve_clone = clones[col].to_string();
        let source = sources[col].to_string();
        let condition = conditions[col].to_string();
        if curve_clone.is_empty() {
            return Err(AppError::new(2, format!("Column {} has an empty clone name.", col + 2)));
        }

        let mut key = WellKey {
            clone: curve_clone,
            source,
            condition,
            replicate: 0,
        };
        key.replicate = dataset.replicate_count(&key.curve_key()) + 1;
        dataset.push_well(key, labels[col], od)?;
    }

    log::debug!(
        "parsed {} wells over {} time points ({} clones, {} conditions)",
        dataset.wells().len(),
        dataset.n_samples(),
        dataset.clones().len(),
        dataset.conditions().len()
    );

    Ok(dataset)
}

fn header_fields(record: &StringRecord) -> Vec<&str> {
    record.iter().skip(1).collect()
}

fn parse_value(field: Option<&str>, line: usize, column: usize) -> Result<f64, AppError> {
    let raw = field.unwrap_or("");
    let value = raw.parse::<f64>().map_err(|_| {
        AppError::new(
            2,
            format!("Non-numeric value '{raw}' on line {line}, column {column}."),
        )
    })?;
    if !value.is_finite() {
        return Err(AppError::new(
            2,
            format!("Non-finite value '{raw}' on line {line}, column {column}."),
        ));
    }
    Ok(value)
}
