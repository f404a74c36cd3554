use crate::dataset::Dataset;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
    /// Rows where both columns held a number.
    pub pairs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    pub fn of(coefficient: f64) -> Self {
        let r = coefficient.abs();
        if r >= 0.7 {
            Strength::Strong
        } else if r >= 0.4 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
        })
    }
}

impl Correlation {
    pub fn strength(&self) -> Strength {
        Strength::of(self.coefficient)
    }
}

/// Sum-based Pearson coefficient over paired samples. A zero denominator
/// (constant input or no pairs) yields 0.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = nf * sum_xy - sum_x * sum_y;
    let spread_x = nf * sum_x2 - sum_x * sum_x;
    let spread_y = nf * sum_y2 - sum_y * sum_y;
    if spread_x <= 0.0 || spread_y <= 0.0 {
        return 0.0;
    }
    let denominator = (spread_x * spread_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Rows where both columns hold a number; a missing value drops only this pair.
pub fn paired_values(dataset: &Dataset, left: usize, right: usize) -> (Vec<f64>, Vec<f64>) {
    dataset
        .rows()
        .iter()
        .filter_map(|row| Some((row[left].as_number()?, row[right].as_number()?)))
        .unzip()
}

/// Pairwise coefficients among the first `cap` numeric columns, strongest first.
pub fn rank_correlations(dataset: &Dataset, numeric_columns: &[String], cap: usize) -> Vec<Correlation> {
    let considered: Vec<(&String, usize)> = numeric_columns
        .iter()
        .take(cap)
        .filter_map(|name| dataset.column_index(name).map(|idx| (name, idx)))
        .collect();

    let mut correlations = Vec::new();
    for (i, &(left, left_idx)) in considered.iter().enumerate() {
        for &(right, right_idx) in &considered[i + 1..] {
            let (x, y) = paired_values(dataset, left_idx, right_idx);
            correlations.push(Correlation {
                left: left.clone(),
                right: right.clone(),
                coefficient: pearson(&x, &y),
                pairs: x.len(),
            });
        }
    }
    correlations.sort_by(|a, b| {
        b.coefficient
            .abs()
            .partial_cmp(&a.coefficient.abs())
            .unwrap_or(Ordering::Equal)
    });
    correlations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    #[test]
    fn test_identical_columns() {
        let x = [1.0, 2.5, 3.0, 8.0, 13.0];
        assert!((pearson(&x, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_columns() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_zero() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_pairwise_drop_and_cap() {
        let n = |v: f64| CellValue::Number(v);
        let dataset = Dataset::new(
            "c.csv",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                vec![n(1.0), n(2.0), n(5.0), n(1.0)],
                vec![n(2.0), CellValue::Null, n(3.0), n(2.0)],
                vec![n(3.0), n(6.0), n(9.0), n(3.0)],
                vec![n(4.0), n(8.0), n(1.0), n(4.0)],
            ],
        );
        let (x, y) = paired_values(&dataset, 0, 1);
        assert_eq!(x, vec![1.0, 3.0, 4.0]);
        assert_eq!(y, vec![2.0, 6.0, 8.0]);

        let columns: Vec<String> = dataset.columns().to_vec();
        let ranked = rank_correlations(&dataset, &columns, 3);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|c| c.left != "d" && c.right != "d"));
        assert_eq!((ranked[0].left.as_str(), ranked[0].right.as_str()), ("a", "b"));
        assert_eq!(ranked[0].pairs, 3);
        assert_eq!(ranked[0].strength(), Strength::Strong);
        assert!(ranked.windows(2).all(|w| w[0].coefficient.abs() >= w[1].coefficient.abs()));
    }
}
