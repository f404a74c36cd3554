use crate::config::{PipelineKeywords, contains_any};
use crate::dataset::Dataset;
use crate::value::CellValue;
use chrono::Datelike;
use indexmap::IndexMap;
use serde::Serialize;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Shares kept per categorical column.
const MAX_SHARES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueShare {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalDistribution {
    pub column: String,
    pub distinct: usize,
    pub shares: Vec<ValueShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPattern {
    pub column: String,
    pub peak_day: String,
    pub count: usize,
    pub percentage: f64,
    pub valid_dates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub categorical: Vec<CategoricalDistribution>,
    pub temporal: Option<TemporalPattern>,
}

impl Distribution {
    /// The categorical column whose most common value holds the largest share,
    /// skipping single-valued columns and columns where every row is distinct.
    pub fn dominant(&self, rows: usize) -> Option<(&CategoricalDistribution, &ValueShare)> {
        let mut best: Option<(&CategoricalDistribution, &ValueShare)> = None;
        for dist in self.categorical.iter().filter(|d| d.distinct > 1 && d.distinct < rows) {
            if let Some(top) = dist.shares.first() {
                if best.is_none_or(|(_, b)| top.percentage > b.percentage) {
                    best = Some((dist, top));
                }
            }
        }
        best
    }
}

/// Frequency of each value over all rows, most common first. Missing cells are
/// counted as `Unknown`; ties keep first-seen order.
pub fn value_distribution<'v>(values: impl IntoIterator<Item = &'v CellValue>) -> Vec<ValueShare> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut total = 0usize;
    for value in values {
        let key = if value.is_null() {
            "Unknown".to_string()
        } else {
            value.label()
        };
        *counts.entry(key).or_insert(0) += 1;
        total += 1;
    }
    let mut shares: Vec<ValueShare> = counts
        .into_iter()
        .map(|(value, count)| ValueShare {
            value,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

pub fn categorical_distribution(dataset: &Dataset, column: &str) -> Option<CategoricalDistribution> {
    let idx = dataset.column_index(column)?;
    if dataset.row_count() == 0 {
        return None;
    }
    let mut shares = value_distribution(dataset.column(idx));
    let distinct = shares.len();
    shares.truncate(MAX_SHARES);
    Some(CategoricalDistribution {
        column: column.to_string(),
        distinct,
        shares,
    })
}

/// Day of week with the most records. Ties resolve toward Sunday.
pub fn peak_weekday(dataset: &Dataset, column: &str) -> Option<TemporalPattern> {
    let idx = dataset.column_index(column)?;
    let mut by_day = [0usize; 7];
    let mut valid = 0usize;
    for date in dataset.column(idx).filter_map(CellValue::as_date) {
        by_day[date.weekday().num_days_from_sunday() as usize] += 1;
        valid += 1;
    }
    if valid == 0 {
        return None;
    }
    let mut peak = 0usize;
    for day in 1..7 {
        if by_day[day] > by_day[peak] {
            peak = day;
        }
    }
    Some(TemporalPattern {
        column: column.to_string(),
        peak_day: DAY_NAMES[peak].to_string(),
        count: by_day[peak],
        percentage: by_day[peak] as f64 / valid as f64 * 100.0,
        valid_dates: valid,
    })
}

pub fn analyze_distribution(
    dataset: &Dataset,
    text_columns: &[String],
    date_columns: &[String],
) -> Distribution {
    Distribution {
        categorical: text_columns
            .iter()
            .filter_map(|col| categorical_distribution(dataset, col))
            .collect(),
        temporal: date_columns.first().and_then(|col| peak_weekday(dataset, col)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPipeline {
    pub source_column: Option<String>,
    pub top_sources: Vec<ValueShare>,
    pub source_count: usize,
    pub qualification_rate: Option<f64>,
    pub stage_count: usize,
    pub location_count: usize,
    pub top_locations: Vec<String>,
    pub average_score: Option<f64>,
    pub high_value_count: usize,
    pub high_value_percentage: f64,
}

/// First column, in dataset order, whose name contains one of the keywords.
pub fn find_column<'d>(dataset: &'d Dataset, keywords: &[String]) -> Option<&'d str> {
    dataset
        .columns()
        .iter()
        .find(|col| contains_any(&col.to_lowercase(), keywords))
        .map(String::as_str)
}

/// Sources, qualification rate, reach and scoring for lead-style datasets.
pub fn lead_pipeline(dataset: &Dataset, keywords: &PipelineKeywords) -> LeadPipeline {
    let mut pipeline = LeadPipeline::default();
    if dataset.row_count() == 0 {
        return pipeline;
    }

    if let Some(source) = find_column(dataset, &keywords.source) {
        if let Some(dist) = categorical_distribution(dataset, source) {
            pipeline.source_column = Some(source.to_string());
            pipeline.source_count = dist.distinct;
            pipeline.top_sources = dist.shares.into_iter().take(3).collect();
        }
    }

    if let Some(status) = find_column(dataset, &keywords.status) {
        if let Some(idx) = dataset.column_index(status) {
            let shares = value_distribution(dataset.column(idx));
            let rate = shares
                .iter()
                .filter(|s| contains_any(&s.value.to_lowercase(), &keywords.qualified))
                .map(|s| s.percentage)
                .sum();
            pipeline.qualification_rate = Some(rate);
            pipeline.stage_count = shares.len();
        }
    }

    if let Some(location) = find_column(dataset, &keywords.location) {
        if let Some(dist) = categorical_distribution(dataset, location) {
            pipeline.location_count = dist.distinct;
            pipeline.top_locations = dist.shares.iter().take(3).map(|s| s.value.clone()).collect();
        }
    }

    if let Some(score) = find_column(dataset, &keywords.score) {
        if let Some(idx) = dataset.column_index(score) {
            let scores = dataset.numeric_values(idx);
            if !scores.is_empty() {
                let avg = scores.iter().sum::<f64>() / scores.len() as f64;
                let high = scores.iter().filter(|&&s| s > avg * 1.2).count();
                pipeline.average_score = Some(avg);
                pipeline.high_value_count = high;
                pipeline.high_value_percentage = high as f64 / scores.len() as f64 * 100.0;
            }
        }
    }

    pipeline
}
