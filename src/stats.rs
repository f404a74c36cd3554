use crate::value::CellValue;
use indexmap::IndexMap;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper-middle element for even counts; the two middle values are not averaged.
    pub median: f64,
    pub std_dev: Option<f64>,
    pub skewness: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub mode: Option<String>,
    pub numeric: Option<NumericStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Skew {
    RightSkewed,
    LeftSkewed,
    Normal,
}

impl Skew {
    pub fn classify(skewness: f64) -> Self {
        if skewness > 0.5 {
            Skew::RightSkewed
        } else if skewness < -0.5 {
            Skew::LeftSkewed
        } else {
            Skew::Normal
        }
    }
}

impl fmt::Display for Skew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Skew::RightSkewed => "right-skewed",
            Skew::LeftSkewed => "left-skewed",
            Skew::Normal => "roughly normal",
        })
    }
}

impl NumericStats {
    pub fn skew(&self) -> Option<Skew> {
        self.skewness.map(Skew::classify)
    }
}

pub fn sort_values(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Value at `floor(fraction * n)` of an ascending slice.
pub fn quantile_at(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((sorted.len() as f64 * fraction).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Descriptive statistics over already-validated numbers. Returns `None` for an
/// empty slice so callers omit the column rather than report zeros.
pub fn summarize(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sort_values(values);
    let min = *sorted.first()?;
    let max = *sorted.last()?;
    let median = sorted[sorted.len() / 2];

    let (mean, std_dev, skewness) = if min == max {
        (min, Some(0.0), None)
    } else {
        // Moments run on values scaled into [-1, 1] so sums near f64::MAX stay finite.
        let scale = min.abs().max(max.abs());
        let scaled: Vec<f64> = values.iter().map(|x| x / scale).collect();
        let scaled_mean = scaled.iter().mean();
        let scaled_std = scaled.iter().population_std_dev();
        let skewness = (scaled_std > 0.0).then(|| {
            let skew_sum: f64 = scaled
                .iter()
                .map(|x| ((x - scaled_mean) / scaled_std).powi(3))
                .sum();
            skew_sum / scaled.len() as f64
        });

        let mean = scaled_mean * scale;
        let mean = if mean.is_finite() { mean.clamp(min, max) } else { median };
        let std_dev = Some(scaled_std * scale).filter(|s| s.is_finite());
        (mean, std_dev, skewness.filter(|s| s.is_finite()))
    };

    Some(NumericStats {
        count: values.len(),
        min,
        max,
        mean,
        median,
        std_dev,
        skewness,
        q1: quantile_at(&sorted, 0.25),
        q3: quantile_at(&sorted, 0.75),
    })
}

/// Counts distinct non-null labels in first-seen order.
pub fn value_counts<'v>(values: impl IntoIterator<Item = &'v CellValue>) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        if !value.is_null() {
            *counts.entry(value.label()).or_insert(0) += 1;
        }
    }
    counts
}

/// Most frequent entry; ties go to the value seen first.
pub fn mode_of(counts: &IndexMap<String, usize>) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for (value, &count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

/// Statistics for one column. Numeric statistics are only attached when the
/// column is numeric and holds at least one number.
pub fn compute_stats(cells: &[&CellValue], numeric: bool) -> ColumnStats {
    let counts = value_counts(cells.iter().copied());
    let null_count = cells.iter().filter(|v| v.is_null()).count();
    let numeric = if numeric {
        let values: Vec<f64> = cells.iter().filter_map(|v| v.as_number()).collect();
        summarize(&values)
    } else {
        None
    };
    ColumnStats {
        count: cells.len() - null_count,
        null_count,
        unique_count: counts.len(),
        mode: mode_of(&counts),
        numeric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_summarize_basic() {
        let stats = summarize(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert_eq!(stats.median, 3.0);
        assert!((stats.std_dev.unwrap() - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(stats.skewness.unwrap().abs() < 1e-12);
        assert_eq!(stats.q1, Some(2.0));
        assert_eq!(stats.q3, Some(4.0));
    }

    #[test]
    fn test_even_count_median_takes_upper_middle() {
        let stats = summarize(&[1.0, 2.0, 3.0, 10.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_population_std_dev() {
        // Sample std dev would be ~2.138; population is exactly 2.
        let stats = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.std_dev.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_right_skew() {
        let stats = summarize(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 20.0]).unwrap();
        assert_eq!(stats.skew(), Some(Skew::RightSkewed));
    }

    #[test]
    fn test_empty_is_omitted() {
        assert!(summarize(&[]).is_none());
        let cells = [CellValue::Null, CellValue::Null];
        let refs: Vec<&CellValue> = cells.iter().collect();
        let stats = compute_stats(&refs, true);
        assert!(stats.numeric.is_none());
        assert_eq!(stats.null_count, 2);
        assert_eq!(stats.unique_count, 0);
        assert_eq!(stats.mode, None);
    }

    #[test]
    fn test_categorical_stats() {
        let cells: Vec<CellValue> = ["web", "email", "web", "", "ads", "email", "web"]
            .iter()
            .map(|v| CellValue::parse(v))
            .collect();
        let refs: Vec<&CellValue> = cells.iter().collect();
        let stats = compute_stats(&refs, false);
        assert_eq!(stats.count, 6);
        assert_eq!(stats.null_count, 1);
        assert_eq!(stats.unique_count, 3);
        assert_eq!(stats.mode.as_deref(), Some("web"));
        assert!(stats.numeric.is_none());
    }

    #[test]
    fn test_mode_tie_goes_to_first_seen() {
        let cells: Vec<CellValue> = ["b", "a", "a", "b"].iter().map(|v| CellValue::parse(v)).collect();
        let counts = value_counts(&cells);
        assert_eq!(mode_of(&counts).as_deref(), Some("b"));
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let stats = summarize(&[1e308, -1e308, 1e308, 5.0]).unwrap();
        assert!(stats.mean.is_finite());
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!((stats.mean - 2.5e307).abs() < 1e293);
        assert!(stats.std_dev.is_some_and(f64::is_finite));
        assert!(stats.skewness.is_some_and(f64::is_finite));
    }

    proptest! {
        #[test]
        fn prop_median_and_mean_within_range(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let stats = summarize(&values).unwrap();
            prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
            prop_assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        }

        #[test]
        fn prop_constant_column_has_zero_spread(value in -1e6f64..1e6, n in 1usize..100) {
            let stats = summarize(&vec![value; n]).unwrap();
            prop_assert_eq!(stats.std_dev, Some(0.0));
            prop_assert_eq!(stats.skewness, None);
        }
    }
}
