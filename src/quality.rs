use crate::dataset::Dataset;
use crate::value::ValueKind;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnQuality {
    pub completeness: f64,
    pub uniqueness: f64,
    pub unique_count: usize,
    pub has_issues: bool,
}

impl ColumnQuality {
    /// `completeness = non_null / rows`, `uniqueness = unique / non_null`, both
    /// as percentages with zero denominators giving 0.
    pub fn score(non_null: usize, unique_count: usize, rows: usize, issue_threshold: f64) -> Self {
        let completeness = if rows == 0 {
            0.0
        } else {
            non_null as f64 / rows as f64 * 100.0
        };
        let uniqueness = if non_null == 0 {
            0.0
        } else {
            unique_count as f64 / non_null as f64 * 100.0
        };
        ColumnQuality {
            completeness,
            uniqueness,
            unique_count,
            has_issues: completeness < issue_threshold || unique_count == 1,
        }
    }

    pub fn composite(&self) -> f64 {
        self.completeness * 0.7 + self.uniqueness * 0.3
    }

    pub fn single_valued(&self) -> bool {
        self.unique_count == 1
    }
}

/// Mean composite score across columns, rounded and bounded to `[0, 100]`.
pub fn overall_score<'q>(columns: impl IntoIterator<Item = &'q ColumnQuality>) -> u32 {
    let (sum, n) = columns
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), q| (sum + q.composite(), n + 1));
    if n == 0 {
        return 0;
    }
    (sum / n as f64).round().clamp(0.0, 100.0) as u32
}

/// Share of columns whose non-null cells all carry the same kind of value.
pub fn type_consistency(dataset: &Dataset) -> f64 {
    let columns = dataset.column_count();
    if columns == 0 {
        return 0.0;
    }
    let consistent = (0..columns)
        .into_par_iter()
        .filter(|&col_idx| {
            let kinds: HashSet<ValueKind> = dataset
                .column(col_idx)
                .map(|v| v.kind())
                .filter(|k| *k != ValueKind::Null)
                .collect();
            kinds.len() <= 1
        })
        .count();
    consistent as f64 / columns as f64 * 100.0
}
