use crate::dataset::Dataset;
use crate::stats::{quantile_at, sort_values};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierReport {
    pub count: usize,
    pub percentage: f64,
    pub min_outlier: Option<f64>,
    pub max_outlier: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingReport {
    pub overall_completeness: f64,
    /// Columns whose missing share exceeds the configured threshold.
    pub problematic: Vec<String>,
}

/// IQR fences around `Q1 = sorted[floor(n/4)]` and `Q3 = sorted[floor(3n/4)]`.
/// Fewer than `min_values` numbers yields an empty report.
pub fn detect_outliers(values: &[f64], multiplier: f64, min_values: usize) -> OutlierReport {
    if values.len() < min_values.max(1) {
        return OutlierReport::default();
    }
    let sorted = sort_values(values);
    let (Some(q1), Some(q3)) = (quantile_at(&sorted, 0.25), quantile_at(&sorted, 0.75)) else {
        return OutlierReport::default();
    };
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    let outliers: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower || v > upper)
        .collect();

    OutlierReport {
        count: outliers.len(),
        percentage: outliers.len() as f64 / values.len() as f64 * 100.0,
        min_outlier: outliers.first().copied(),
        max_outlier: outliers.last().copied(),
        lower_bound: Some(lower).filter(|b| b.is_finite()),
        upper_bound: Some(upper).filter(|b| b.is_finite()),
    }
}

/// Rows identical to an earlier row.
pub fn detect_duplicates(dataset: &Dataset) -> DuplicateReport {
    let rows = dataset.rows();
    if rows.is_empty() {
        return DuplicateReport::default();
    }
    let keys: Vec<Vec<String>> = rows
        .par_iter()
        .map(|row| row.iter().map(|v| v.label()).collect())
        .collect();
    let unique: HashSet<&Vec<String>> = keys.iter().collect();
    let count = rows.len() - unique.len();
    DuplicateReport {
        count,
        percentage: count as f64 / rows.len() as f64 * 100.0,
    }
}

pub fn scan_missing(dataset: &Dataset, threshold: f64) -> MissingReport {
    let rows = dataset.row_count();
    if rows == 0 || dataset.column_count() == 0 {
        return MissingReport::default();
    }
    let missing_pct: Vec<f64> = (0..dataset.column_count())
        .into_par_iter()
        .map(|col_idx| {
            let missing = dataset.column(col_idx).filter(|v| v.is_null()).count();
            missing as f64 / rows as f64 * 100.0
        })
        .collect();

    let avg_missing = missing_pct.iter().sum::<f64>() / missing_pct.len() as f64;
    let problematic = dataset
        .columns()
        .iter()
        .zip(&missing_pct)
        .filter(|&(_, &pct)| pct > threshold)
        .map(|(name, _)| name.clone())
        .collect();

    MissingReport {
        overall_completeness: 100.0 - avg_missing,
        problematic,
    }
}
