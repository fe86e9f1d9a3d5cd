//! Clone-vs-clone similarity across growth conditions.
//!
//! - Dice: ordinal agreement of growth classes, 1.0 for identical profiles
//! - Pearson: `1 − r` over adjusted harmonic means, 0.0 for identical profiles
//!
//! Both are reported as lower-triangular matrices in clone order.

use serde::Serialize;

use crate::domain::{Grade, GradeScale};
use crate::math::pearson;

/// Agreement table for the four-class scale (row = earlier clone).
const DICE_FOUR: [[f64; 4]; 4] = [
    [2.0, 1.0, 0.5, 0.0],
    [1.0, 2.0, 1.0, 0.5],
    [0.5, 1.0, 2.0, 1.0],
    [0.0, 0.5, 1.0, 2.0],
];

/// Agreement table for the five-class scale. Only `D→E` and `E→E` extend the
/// four-class table; every other cell involving `E` scores 0.
const DICE_FIVE: [[f64; 5]; 5] = [
    [2.0, 1.0, 0.5, 0.0, 0.0],
    [1.0, 2.0, 1.0, 0.5, 0.0],
    [0.5, 1.0, 2.0, 1.0, 0.0],
    [0.0, 0.5, 1.0, 2.0, 1.0],
    [0.0, 0.0, 0.0, 0.0, 2.0],
];

/// Table score for an ordered pair of grades.
pub fn dice_score(a: Grade, b: Grade, scale: GradeScale) -> f64 {
    let (i, j) = (a.rank(), b.rank());
    match scale {
        GradeScale::Four if i < 4 && j < 4 => DICE_FOUR[i][j],
        GradeScale::Four => 0.0,
        GradeScale::Five => DICE_FIVE[i][j],
    }
}

/// Dice similarity of two grade profiles aligned by condition.
///
/// Conditions where either clone is unclassified are skipped. NaN when no
/// condition is shared.
pub fn dice_similarity(a: &[Option<Grade>], b: &[Option<Grade>], scale: GradeScale) -> f64 {
    let mut total = 0.0;
    let mut shared = 0usize;
    for (ga, gb) in a.iter().zip(b) {
        if let (Some(ga), Some(gb)) = (ga, gb) {
            total += dice_score(*ga, *gb, scale);
            shared += 1;
        }
    }
    if shared == 0 {
        return f64::NAN;
    }
    total / (2.0 * shared as f64)
}

/// `1 − r` over the conditions both clones have a value for. NaN when the
/// correlation is undefined.
pub fn pearson_dissimilarity(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    pearson(&xs, &ys).map(|r| 1.0 - r).unwrap_or(f64::NAN)
}

/// Lower-triangular clone × clone matrix.
///
/// `rows[i - 1]` belongs to clone `i` (for `i ≥ 1`) and holds the entries
/// against clones `0..i`.
#[derive(Debug, Clone, Serialize)]
pub struct LowerTriangle {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl LowerTriangle {
    /// Build from a pair function `f(earlier, later)`.
    pub fn build(labels: &[String], f: impl Fn(usize, usize) -> f64) -> Self {
        let rows = (1..labels.len())
            .map(|i| (0..i).map(|j| f(j, i)).collect())
            .collect();
        Self {
            labels: labels.to_vec(),
            rows,
        }
    }

    /// Column headers: every clone but the last.
    pub fn column_labels(&self) -> &[String] {
        let n = self.labels.len().saturating_sub(1);
        &self.labels[..n]
    }

    /// Row headers: every clone but the first.
    pub fn row_labels(&self) -> &[String] {
        if self.labels.is_empty() {
            &self.labels
        } else {
            &self.labels[1..]
        }
    }

    /// Entry for clones `i` and `j` (order-insensitive). `None` on the
    /// diagonal or out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        if row == col {
            return None;
        }
        self.rows.get(row - 1)?.get(col).copied()
    }
}

/// Pairwise Dice matrix over per-clone grade profiles.
pub fn dice_matrix(labels: &[String], profiles: &[Vec<Option<Grade>>], scale: GradeScale) -> LowerTriangle {
    LowerTriangle::build(labels, |j, i| dice_similarity(&profiles[j], &profiles[i], scale))
}

/// Pairwise Pearson dissimilarity matrix over per-clone harmonic-mean profiles.
pub fn pearson_matrix(labels: &[String], profiles: &[Vec<Option<f64>>]) -> LowerTriangle {
    LowerTriangle::build(labels, |j, i| pearson_dissimilarity(&profiles[j], &profiles[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{i}")).collect()
    }

    #[test]
    fn dice_self_similarity_is_one() {
        for profile in [
            vec![Some(Grade::A)],
            vec![Some(Grade::B), Some(Grade::D), Some(Grade::C)],
            vec![Some(Grade::D); 12],
        ] {
            assert_eq!(dice_similarity(&profile, &profile, GradeScale::Four), 1.0);
        }
        let five = vec![Some(Grade::E), Some(Grade::A)];
        assert_eq!(dice_similarity(&five, &five, GradeScale::Five), 1.0);
    }

    #[test]
    fn dice_uses_table_and_skips_unclassified() {
        let a = vec![Some(Grade::A), Some(Grade::B), None];
        let b = vec![Some(Grade::C), Some(Grade::B), Some(Grade::A)];
        // (0.5 + 2) / (2 · 2)
        assert!((dice_similarity(&a, &b, GradeScale::Four) - 0.625).abs() < 1e-12);
    }

    #[test]
    fn dice_without_shared_conditions_is_nan() {
        let a = vec![Some(Grade::A), None];
        let b = vec![None, Some(Grade::A)];
        assert!(dice_similarity(&a, &b, GradeScale::Four).is_nan());
    }

    #[test]
    fn five_class_table_is_directional_for_e() {
        assert_eq!(dice_score(Grade::D, Grade::E, GradeScale::Five), 1.0);
        assert_eq!(dice_score(Grade::E, Grade::D, GradeScale::Five), 0.0);
        assert_eq!(dice_score(Grade::A, Grade::E, GradeScale::Five), 0.0);
        assert_eq!(dice_score(Grade::B, Grade::D, GradeScale::Five), 0.5);
    }

    #[test]
    fn pearson_self_dissimilarity_is_zero() {
        let p = vec![Some(0.8), Some(0.4), Some(0.6), None];
        assert!(pearson_dissimilarity(&p, &p).abs() < 1e-12);
    }

    #[test]
    fn pearson_needs_two_shared_points() {
        let a = vec![Some(0.8), None, Some(0.3)];
        let b = vec![Some(0.5), Some(0.4), None];
        assert!(pearson_dissimilarity(&a, &b).is_nan());
    }

    #[test]
    fn anticorrelated_profiles_score_two() {
        let a = vec![Some(0.2), Some(0.4), Some(0.6)];
        let b = vec![Some(0.6), Some(0.4), Some(0.2)];
        assert!((pearson_dissimilarity(&a, &b) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn lower_triangle_layout() {
        let names = labels(4);
        let m = LowerTriangle::build(&names, |j, i| (10 * j + i) as f64);
        assert_eq!(m.rows.len(), 3);
        assert_eq!(m.rows[0], vec![1.0]);
        assert_eq!(m.rows[2], vec![3.0, 13.0, 23.0]);
        assert_eq!(m.column_labels(), &names[..3]);
        assert_eq!(m.row_labels(), &names[1..]);
        assert_eq!(m.get(1, 3), Some(13.0));
        assert_eq!(m.get(2, 2), None);
    }

    #[test]
    fn single_clone_has_empty_matrix() {
        let m = dice_matrix(&labels(1), &[vec![Some(Grade::A)]], GradeScale::Four);
        assert!(m.rows.is_empty());
        assert!(m.column_labels().is_empty());
        assert!(m.row_labels().is_empty());
    }
}
