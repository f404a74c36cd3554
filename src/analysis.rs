use crate::MutterError;
use crate::cleaning::{
    DuplicateReport, MissingReport, OutlierReport, detect_duplicates, detect_outliers, scan_missing,
};
use crate::config::InsightConfig;
use crate::correlation::{Correlation, rank_correlations};
use crate::dataset::{Dataset, Metadata, MetadataStatistics};
use crate::distribution::{Distribution, analyze_distribution};
use crate::quality::{ColumnQuality, overall_score, type_consistency};
use crate::stats::{ColumnStats, NumericStats, compute_stats};
use crate::text::{TextInsights, analyze_text};
use crate::types::{ColumnTypeInferer, DomainRole, InferredType};
use crate::value::CellValue;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

const SAMPLE_VALUE_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    pub domain_role: Option<DomainRole>,
    pub statistics: ColumnStats,
    pub completeness: f64,
}

/// Everything the narrator and chart selector read about one dataset. Built
/// fresh per request and dropped after rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub profiles: IndexMap<String, ColumnProfile>,
    pub data_quality: IndexMap<String, ColumnQuality>,
    pub quality_score: u32,
    pub outliers: IndexMap<String, OutlierReport>,
    pub correlations: Vec<Correlation>,
    pub distribution: Distribution,
    pub duplicates: DuplicateReport,
    pub missing: MissingReport,
    pub type_consistency: f64,
    pub text: Option<TextInsights>,
    pub sample_values: IndexMap<String, Vec<String>>,
    pub sheet_names: Vec<String>,
    pub from_metadata: bool,
}

struct ColumnSummary {
    profile: ColumnProfile,
    quality: ColumnQuality,
    outliers: Option<OutlierReport>,
    samples: Vec<String>,
}

fn json_label(value: &serde_json::Value) -> String {
    CellValue::from_json(value).label()
}

fn summarize_column(
    name: &str,
    inferred_type: InferredType,
    statistics: ColumnStats,
    samples: Vec<String>,
    numbers: &[f64],
    inferer: &ColumnTypeInferer<'_>,
    rows: usize,
    config: &InsightConfig,
) -> ColumnSummary {
    let quality = ColumnQuality::score(
        statistics.count,
        statistics.unique_count,
        rows,
        config.completeness_issue_threshold,
    );
    let outliers = (inferred_type == InferredType::Numeric).then(|| {
        detect_outliers(
            numbers,
            config.outlier_iqr_multiplier,
            config.min_outlier_values,
        )
    });
    ColumnSummary {
        profile: ColumnProfile {
            name: name.to_string(),
            inferred_type,
            domain_role: inferer.role(name),
            statistics,
            completeness: quality.completeness,
        },
        quality,
        outliers,
        samples,
    }
}

fn raw_samples(cells: &[&CellValue]) -> Vec<String> {
    cells
        .iter()
        .filter(|v| !v.is_null())
        .take(SAMPLE_VALUE_COUNT)
        .map(|v| v.label())
        .collect()
}

fn profile_column(
    dataset: &Dataset,
    col_idx: usize,
    inferer: &ColumnTypeInferer<'_>,
    config: &InsightConfig,
) -> ColumnSummary {
    let name = &dataset.columns()[col_idx];
    let cells: Vec<&CellValue> = dataset.column(col_idx).collect();
    let inferred = inferer.infer(name, cells.iter().copied());
    let statistics = compute_stats(&cells, inferred == InferredType::Numeric);
    let numbers: Vec<f64> = cells.iter().filter_map(|v| v.as_number()).collect();
    summarize_column(
        name,
        inferred,
        statistics,
        raw_samples(&cells),
        &numbers,
        inferer,
        dataset.row_count(),
        config,
    )
}

/// Metadata supplies type, counts and base statistics; spread and shape still
/// come from the raw rows because the upstream parser does not record them.
fn merge_metadata_stats(
    meta: &MetadataStatistics,
    raw: ColumnStats,
    rows: usize,
    numeric: bool,
) -> ColumnStats {
    let numeric_stats = if numeric {
        match (meta.min, meta.max, meta.avg) {
            (Some(min), Some(max), Some(avg)) => {
                let raw_numeric = raw.numeric.as_ref();
                Some(NumericStats {
                    count: raw_numeric.map_or(rows.saturating_sub(meta.null_count), |n| n.count),
                    min,
                    max,
                    mean: avg,
                    median: meta
                        .median
                        .or(raw_numeric.map(|n| n.median))
                        .unwrap_or(avg),
                    std_dev: raw_numeric.and_then(|n| n.std_dev),
                    skewness: raw_numeric.and_then(|n| n.skewness),
                    q1: raw_numeric.and_then(|n| n.q1),
                    q3: raw_numeric.and_then(|n| n.q3),
                })
            }
            _ => raw.numeric.clone(),
        }
    } else {
        None
    };
    ColumnStats {
        count: rows.saturating_sub(meta.null_count),
        null_count: meta.null_count,
        unique_count: meta.unique_count,
        mode: meta.mode.as_ref().map(json_label).or(raw.mode),
        numeric: numeric_stats,
    }
}

fn profile_from_metadata(
    dataset: &Dataset,
    col_idx: usize,
    metadata: &Metadata,
    inferer: &ColumnTypeInferer<'_>,
    config: &InsightConfig,
) -> ColumnSummary {
    let name = &dataset.columns()[col_idx];
    let cells: Vec<&CellValue> = dataset.column(col_idx).collect();
    let inferred = metadata
        .data_types
        .get(name)
        .and_then(|t| InferredType::from_metadata(t))
        .unwrap_or_else(|| inferer.infer(name, cells.iter().copied()));
    let is_numeric = inferred == InferredType::Numeric;
    let raw = compute_stats(&cells, is_numeric);
    let statistics = match metadata.statistics.get(name) {
        Some(meta) => merge_metadata_stats(meta, raw, dataset.row_count(), is_numeric),
        None => raw,
    };
    let samples = match metadata.sample_values.get(name) {
        Some(values) => values
            .iter()
            .take(SAMPLE_VALUE_COUNT)
            .map(json_label)
            .collect(),
        None => raw_samples(&cells),
    };
    let numbers: Vec<f64> = cells.iter().filter_map(|v| v.as_number()).collect();
    summarize_column(
        name,
        inferred,
        statistics,
        samples,
        &numbers,
        inferer,
        dataset.row_count(),
        config,
    )
}

impl AnalysisResult {
    /// Profiles every column (in parallel, collected in column order) and runs
    /// the dataset-wide detectors. Uses attached metadata when present.
    pub fn build(dataset: &Dataset, config: &InsightConfig) -> Result<Self, MutterError> {
        if dataset.column_count() == 0 {
            return Err(MutterError::NoColumns);
        }
        if dataset.row_count() == 0 {
            return Err(MutterError::EmptyDataset);
        }
        debug!(
            file = dataset.file_name(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            metadata = dataset.metadata().is_some(),
            "profiling dataset"
        );

        let inferer = ColumnTypeInferer::new(config);
        let summaries: Vec<ColumnSummary> = match dataset.metadata() {
            Some(metadata) => (0..dataset.column_count())
                .into_par_iter()
                .map(|col_idx| profile_from_metadata(dataset, col_idx, metadata, &inferer, config))
                .collect(),
            None => (0..dataset.column_count())
                .into_par_iter()
                .map(|col_idx| profile_column(dataset, col_idx, &inferer, config))
                .collect(),
        };

        let mut numeric_columns = Vec::new();
        let mut text_columns = Vec::new();
        let mut date_columns = Vec::new();
        let mut profiles = IndexMap::new();
        let mut data_quality = IndexMap::new();
        let mut outliers = IndexMap::new();
        let mut sample_values = IndexMap::new();

        for summary in summaries {
            let name = summary.profile.name.clone();
            match summary.profile.inferred_type {
                InferredType::Numeric => numeric_columns.push(name.clone()),
                InferredType::Date => date_columns.push(name.clone()),
                InferredType::Text | InferredType::Boolean | InferredType::Mixed => {
                    text_columns.push(name.clone())
                }
            }
            if let Some(report) = summary.outliers {
                outliers.insert(name.clone(), report);
            }
            data_quality.insert(name.clone(), summary.quality);
            sample_values.insert(name.clone(), summary.samples);
            profiles.insert(name, summary.profile);
        }

        let quality_score = overall_score(data_quality.values());
        let correlations =
            rank_correlations(dataset, &numeric_columns, config.correlation_column_cap);
        let distribution = analyze_distribution(dataset, &text_columns, &date_columns);

        Ok(AnalysisResult {
            file_name: dataset.file_name().to_string(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            numeric_columns,
            text_columns,
            date_columns,
            profiles,
            data_quality,
            quality_score,
            outliers,
            correlations,
            distribution,
            duplicates: detect_duplicates(dataset),
            missing: scan_missing(dataset, config.missing_data_threshold),
            type_consistency: type_consistency(dataset),
            text: analyze_text(dataset, config.sample_size),
            sample_values,
            sheet_names: dataset
                .metadata()
                .and_then(|m| m.sheet_names.clone())
                .unwrap_or_default(),
            from_metadata: dataset.metadata().is_some(),
        })
    }

    pub fn profile(&self, column: &str) -> Option<&ColumnProfile> {
        self.profiles.get(column)
    }

    pub fn numeric_stats(&self, column: &str) -> Option<&NumericStats> {
        self.profiles
            .get(column)
            .and_then(|p| p.statistics.numeric.as_ref())
    }

    /// The first numeric column, which narration treats as the headline metric.
    pub fn primary_metric(&self) -> Option<&str> {
        self.numeric_columns.first().map(String::as_str)
    }

    pub fn issue_columns(&self) -> impl Iterator<Item = (&String, &ColumnQuality)> {
        self.data_quality.iter().filter(|(_, q)| q.has_issues)
    }

    /// The cacheable shape an upload pipeline stores next to the rows.
    pub fn to_metadata(&self) -> Metadata {
        let data_types = self
            .profiles
            .iter()
            .map(|(name, p)| {
                let ty = match p.inferred_type {
                    InferredType::Numeric => "number",
                    InferredType::Text => "string",
                    InferredType::Date => "date",
                    InferredType::Boolean => "boolean",
                    InferredType::Mixed => "mixed",
                };
                (name.clone(), ty.to_string())
            })
            .collect();
        let statistics = self
            .profiles
            .iter()
            .map(|(name, p)| {
                let numeric = p.statistics.numeric.as_ref();
                let stats = MetadataStatistics {
                    min: numeric.map(|n| n.min),
                    max: numeric.map(|n| n.max),
                    avg: numeric.map(|n| n.mean),
                    median: numeric.map(|n| n.median),
                    mode: p.statistics.mode.clone().map(serde_json::Value::String),
                    null_count: p.statistics.null_count,
                    unique_count: p.statistics.unique_count,
                    data_type: None,
                };
                (name.clone(), stats)
            })
            .collect();
        let sample_values = self
            .sample_values
            .iter()
            .map(|(name, values)| {
                (
                    name.clone(),
                    values
                        .iter()
                        .map(|v| serde_json::Value::String(v.clone()))
                        .collect(),
                )
            })
            .collect();
        Metadata {
            data_types,
            statistics,
            sample_values,
            sheet_names: (!self.sheet_names.is_empty()).then(|| self.sheet_names.clone()),
        }
    }
}
