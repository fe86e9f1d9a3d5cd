//! In-memory plate data: wells keyed by `WellKey` plus the shared time vector.
//!
//! Wells are stored in input column order; a `BTreeMap` index gives keyed
//! access without nesting maps per clone/source/condition.

use std::collections::BTreeMap;

use crate::domain::{ConditionKey, CurveKey, WellKey};
use crate::error::AppError;

/// One replicate curve.
#[derive(Debug, Clone)]
pub struct Well {
    pub key: WellKey,
    /// Plate position label from the input (e.g. `A1`).
    pub label: String,
    pub od: Vec<f64>,
    pub filtered: bool,
}

#[derive(Debug, Clone)]
pub struct DataSet {
    time: Vec<f64>,
    wells: Vec<Well>,
    index: BTreeMap<WellKey, usize>,
    clones: Vec<String>,
    conditions: Vec<ConditionKey>,
    curve_keys: Vec<CurveKey>,
}

impl DataSet {
    /// Create an empty dataset over a strictly increasing time vector.
    pub fn new(time: Vec<f64>) -> Result<Self, AppError> {
        if time.is_empty() {
            return Err(AppError::new(2, "Time vector is empty."));
        }
        if let Some(bad) = time.iter().position(|t| !t.is_finite()) {
            return Err(AppError::new(2, format!("Non-finite time value at sample {bad}.")));
        }
        if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(AppError::new(
                2,
                format!(
                    "Time vector must be strictly increasing (sample {} = {} after {}).",
                    i + 1,
                    time[i + 1],
                    time[i]
                ),
            ));
        }
        Ok(Self {
            time,
            wells: Vec::new(),
            index: BTreeMap::new(),
            clones: Vec::new(),
            conditions: Vec::new(),
            curve_keys: Vec::new(),
        })
    }

    /// Add a replicate curve. The OD sequence must align with the time vector.
    pub fn push_well(&mut self, key: WellKey, label: impl Into<String>, od: Vec<f64>) -> Result<(), AppError> {
        if od.len() != self.time.len() {
            return Err(AppError::new(
                2,
                format!(
                    "Well {} replicate {} has {} readings but the time vector has {}.",
                    key.curve_key(),
                    key.replicate,
                    od.len(),
                    self.time.len()
                ),
            ));
        }
        if self.index.contains_key(&key) {
            return Err(AppError::new(
                2,
                format!("Duplicate well {} replicate {}.", key.curve_key(), key.replicate),
            ));
        }

        if !self.clones.contains(&key.clone) {
            self.clones.push(key.clone.clone());
        }
        let curve = key.curve_key();
        let condition = curve.condition_key();
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
        if !self.curve_keys.contains(&curve) {
            self.curve_keys.push(curve);
        }

        self.index.insert(key.clone(), self.wells.len());
        self.wells.push(Well {
            key,
            label: label.into(),
            od,
            filtered: false,
        });
        Ok(())
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn n_samples(&self) -> usize {
        self.time.len()
    }

    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    pub fn well(&self, key: &WellKey) -> Option<&Well> {
        self.index.get(key).map(|&i| &self.wells[i])
    }

    /// Set the filter flag of a well. Returns `false` if the key is unknown.
    pub fn set_filtered(&mut self, key: &WellKey, filtered: bool) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.wells[i].filtered = filtered;
                true
            }
            None => false,
        }
    }

    /// Clones in order of first appearance. The first one is the control.
    pub fn clones(&self) -> &[String] {
        &self.clones
    }

    /// Growth conditions in order of first appearance.
    pub fn conditions(&self) -> &[ConditionKey] {
        &self.conditions
    }

    /// Replicate groups in order of first appearance.
    pub fn curve_keys(&self) -> &[CurveKey] {
        &self.curve_keys
    }

    /// All replicates of a group (filtered or not), in replicate order.
    pub fn replicates<'a>(&'a self, key: &'a CurveKey) -> impl Iterator<Item = &'a Well> + 'a {
        self.wells.iter().filter(move |w| {
            w.key.clone == key.clone && w.key.source == key.source && w.key.condition == key.condition
        })
    }

    /// Number of replicates already stored for a group.
    pub fn replicate_count(&self, key: &CurveKey) -> usize {
        self.replicates(key).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(clone: &str, condition: &str, replicate: usize) -> WellKey {
        WellKey {
            clone: clone.to_string(),
            source: "Carbon".to_string(),
            condition: condition.to_string(),
            replicate,
        }
    }

    #[test]
    fn rejects_non_increasing_time() {
        assert!(DataSet::new(vec![0.0, 0.5, 0.5]).is_err());
        assert!(DataSet::new(vec![]).is_err());
        assert!(DataSet::new(vec![0.0, 0.5, 1.0]).is_ok());
    }

    #[test]
    fn rejects_misaligned_and_duplicate_wells() {
        let mut ds = DataSet::new(vec![0.0, 1.0]).unwrap();
        assert!(ds.push_well(key("WT", "Glc", 1), "A1", vec![0.1]).is_err());
        ds.push_well(key("WT", "Glc", 1), "A1", vec![0.1, 0.2]).unwrap();
        assert!(ds.push_well(key("WT", "Glc", 1), "A1", vec![0.1, 0.2]).is_err());
    }

    #[test]
    fn tracks_insertion_order_and_filter_flags() {
        let mut ds = DataSet::new(vec![0.0, 1.0]).unwrap();
        ds.push_well(key("WT", "Glc", 1), "A1", vec![0.1, 0.2]).unwrap();
        ds.push_well(key("WT", "Glc", 2), "A1", vec![0.1, 0.3]).unwrap();
        ds.push_well(key("M1", "Glc", 1), "A1", vec![0.1, 0.4]).unwrap();
        ds.push_well(key("WT", "Fru", 1), "A2", vec![0.1, 0.5]).unwrap();

        assert_eq!(ds.clones(), &["WT".to_string(), "M1".to_string()]);
        assert_eq!(ds.conditions().len(), 2);
        assert_eq!(ds.curve_keys().len(), 3);

        let group = key("WT", "Glc", 1).curve_key();
        assert_eq!(ds.replicate_count(&group), 2);

        assert!(ds.set_filtered(&key("WT", "Glc", 2), true));
        assert!(ds.well(&key("WT", "Glc", 2)).unwrap().filtered);
        assert!(!ds.set_filtered(&key("XX", "Glc", 1), true));
    }
}
