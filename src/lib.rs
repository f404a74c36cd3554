pub mod analysis;
pub mod charts;
pub mod cleaning;
pub mod config;
pub mod correlation;
pub mod dataset;
pub mod distribution;
pub mod domain;
pub mod format;
pub mod narrator;
pub mod quality;
pub mod stats;
pub mod text;
mod tui;
pub mod types;
pub mod value;

pub use analysis::{AnalysisResult, ColumnProfile};
pub use charts::{ChartArtifact, ChartKind, ChartSelector};
pub use config::InsightConfig;
pub use dataset::{Dataset, Metadata};
pub use domain::{DomainClassifier, DomainLabel};
pub use narrator::{InsightNarrator, Intent};
use thiserror::Error;
use tracing::debug;
pub use tui::render_tui;
pub use value::CellValue;

#[derive(Debug, Error)]
pub enum MutterError {
    #[error("Empty dataset provided")]
    EmptyDataset,
    #[error("Dataset has no columns")]
    NoColumns,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Owns the tuning tables and runs the whole pipeline: profile, classify,
/// narrate, and pick charts.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: InsightConfig) -> Self {
        InsightEngine { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    pub fn profile(&self, dataset: &Dataset) -> Result<AnalysisResult, MutterError> {
        AnalysisResult::build(dataset, &self.config)
    }

    pub fn classify(&self, dataset: &Dataset, analysis: &AnalysisResult) -> DomainLabel {
        DomainClassifier::new(&self.config).classify(
            dataset.columns(),
            Some(dataset.file_name()),
            analysis.numeric_columns.len(),
        )
    }

    /// Narrates `query` against `dataset`. Never fails: input that cannot be
    /// profiled, or an empty query, gets the generic processing sentence.
    pub fn analyze(&self, query: &str, dataset: &Dataset) -> String {
        let fallback = || narrator::fallback(dataset.file_name(), dataset.row_count(), query);
        if query.trim().is_empty() {
            debug!("empty query, using fallback narration");
            return fallback();
        }
        match self.profile(dataset) {
            Ok(analysis) => {
                let domain = self.classify(dataset, &analysis);
                InsightNarrator::new(&self.config).narrate(query, dataset, &analysis, domain)
            }
            Err(err) => {
                debug!(error = %err, "dataset not analyzable, using fallback narration");
                fallback()
            }
        }
    }

    /// Chart configurations for `dataset`; empty when it cannot be profiled.
    pub fn select_charts(&self, dataset: &Dataset) -> Vec<ChartArtifact> {
        match self.profile(dataset) {
            Ok(analysis) => ChartSelector::new(&self.config.charts).select(dataset, &analysis),
            Err(err) => {
                debug!(error = %err, "no charts for dataset");
                Vec::new()
            }
        }
    }
}

/// [`InsightEngine::analyze`] with the default configuration.
pub fn analyze(query: &str, dataset: &Dataset) -> String {
    InsightEngine::default().analyze(query, dataset)
}

/// [`InsightEngine::select_charts`] with the default configuration.
pub fn select_charts(dataset: &Dataset) -> Vec<ChartArtifact> {
    InsightEngine::default().select_charts(dataset)
}
