use crate::MutterError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DATE_KEYWORDS: &[&str] = &["date", "time", "created", "updated"];
pub const GEO_KEYWORDS: &[&str] = &["city", "state", "country", "region", "location", "address", "zip"];
pub const CURRENCY_KEYWORDS: &[&str] = &[
    "price", "amount", "revenue", "cost", "salary", "budget", "expense", "profit", "value", "usd",
];
pub const SCORE_KEYWORDS: &[&str] = &["score", "rating", "grade", "marks", "priority"];
// Matched against the name padded with underscores, so `id` and `lead_id` hit
// while `paid` does not.
pub const IDENTIFIER_KEYWORDS: &[&str] = &["_id_", "uuid", "identifier"];
pub const CATEGORY_KEYWORDS: &[&str] = &[
    "category", "type", "status", "stage", "source", "segment", "class", "group",
];

pub const LEAD_INDICATORS: &[&str] = &[
    "lead", "prospect", "contact", "deal", "stage", "source", "owner", "company", "qualification",
];
pub const SALES_INDICATORS: &[&str] = &[
    "revenue", "price", "amount", "sales", "product", "order", "customer", "purchase",
];
pub const ACADEMIC_INDICATORS: &[&str] = &[
    "student", "grade", "marks", "score", "exam", "subject", "class", "academic",
];
pub const HR_INDICATORS: &[&str] = &[
    "employee", "staff", "department", "salary", "hire", "performance", "manager",
];
pub const FINANCIAL_INDICATORS: &[&str] = &[
    "budget", "expense", "cost", "profit", "financial", "accounting", "invoice",
];
pub const EMAIL_KEYWORDS: &[&str] = &["email", "mail"];
pub const PHONE_KEYWORDS: &[&str] = &["phone", "tel"];
pub const NAME_KEYWORDS: &[&str] = &["name", "first", "last"];

pub const LEAD_SOURCE_KEYWORDS: &[&str] = &["source", "channel", "origin", "campaign"];
pub const LEAD_STATUS_KEYWORDS: &[&str] = &["status", "stage", "qualified", "converted"];
pub const QUALIFIED_MARKERS: &[&str] = &["qualified", "converted", "won"];
pub const LEAD_SCORE_KEYWORDS: &[&str] = &["score", "rating", "priority", "value"];

pub const DEEP_INTENT: &[&str] = &["deep", "detailed", "comprehensive"];
pub const TOP_INTENT: &[&str] = &["top", "best", "highest"];
pub const PATTERN_INTENT: &[&str] = &["pattern", "trend", "correlation"];
pub const PROBLEM_INTENT: &[&str] = &["problem", "issue", "concern", "quality"];
pub const SUMMARY_INTENT: &[&str] = &["summary", "overview", "insights"];
pub const STRUCTURE_INTENT: &[&str] = &["column", "field", "data type"];

pub const LABEL_KEYWORDS: &[&str] = &["name", "product", "category", "title"];

/// Number of leading numeric columns compared pairwise for correlations.
pub const CORRELATION_COLUMN_CAP: usize = 3;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Keyword tables for column typing and role inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnKeywords {
    pub date: Vec<String>,
    pub geo: Vec<String>,
    pub currency: Vec<String>,
    pub score: Vec<String>,
    pub identifier: Vec<String>,
    pub category: Vec<String>,
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        ColumnKeywords {
            date: words(DATE_KEYWORDS),
            geo: words(GEO_KEYWORDS),
            currency: words(CURRENCY_KEYWORDS),
            score: words(SCORE_KEYWORDS),
            identifier: words(IDENTIFIER_KEYWORDS),
            category: words(CATEGORY_KEYWORDS),
        }
    }
}

/// Indicator sets scored by the domain classifier, plus the contact fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainKeywords {
    pub lead: Vec<String>,
    pub sales: Vec<String>,
    pub academic: Vec<String>,
    pub hr: Vec<String>,
    pub financial: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub name: Vec<String>,
    /// Share of numeric columns above which an unmatched dataset is `analytics`.
    pub analytics_numeric_ratio: f64,
}

impl Default for DomainKeywords {
    fn default() -> Self {
        DomainKeywords {
            lead: words(LEAD_INDICATORS),
            sales: words(SALES_INDICATORS),
            academic: words(ACADEMIC_INDICATORS),
            hr: words(HR_INDICATORS),
            financial: words(FINANCIAL_INDICATORS),
            email: words(EMAIL_KEYWORDS),
            phone: words(PHONE_KEYWORDS),
            name: words(NAME_KEYWORDS),
            analytics_numeric_ratio: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineKeywords {
    pub source: Vec<String>,
    pub status: Vec<String>,
    pub qualified: Vec<String>,
    pub score: Vec<String>,
    pub location: Vec<String>,
}

impl Default for PipelineKeywords {
    fn default() -> Self {
        PipelineKeywords {
            source: words(LEAD_SOURCE_KEYWORDS),
            status: words(LEAD_STATUS_KEYWORDS),
            qualified: words(QUALIFIED_MARKERS),
            score: words(LEAD_SCORE_KEYWORDS),
            location: words(GEO_KEYWORDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentKeywords {
    pub deep: Vec<String>,
    pub top: Vec<String>,
    pub pattern: Vec<String>,
    pub problem: Vec<String>,
    pub summary: Vec<String>,
    pub structure: Vec<String>,
}

impl Default for IntentKeywords {
    fn default() -> Self {
        IntentKeywords {
            deep: words(DEEP_INTENT),
            top: words(TOP_INTENT),
            pattern: words(PATTERN_INTENT),
            problem: words(PROBLEM_INTENT),
            summary: words(SUMMARY_INTENT),
            structure: words(STRUCTURE_INTENT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLimits {
    pub top_n: usize,
    pub category_max_distinct: usize,
    pub doughnut_max_slices: usize,
    pub trend_max_points: usize,
    pub label_keywords: Vec<String>,
    pub base_url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartLimits {
    fn default() -> Self {
        ChartLimits {
            top_n: 5,
            category_max_distinct: 10,
            doughnut_max_slices: 6,
            trend_max_points: 20,
            label_keywords: words(LABEL_KEYWORDS),
            base_url: "https://quickchart.io/chart".to_string(),
            width: 600,
            height: 400,
        }
    }
}

/// Immutable tuning for one engine instance. Every table has a built-in default;
/// a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub sample_size: usize,
    pub correlation_column_cap: usize,
    pub outlier_iqr_multiplier: f64,
    pub min_outlier_values: usize,
    pub completeness_issue_threshold: f64,
    pub missing_data_threshold: f64,
    pub columns: ColumnKeywords,
    pub domains: DomainKeywords,
    pub pipeline: PipelineKeywords,
    pub intents: IntentKeywords,
    pub charts: ChartLimits,
}

impl Default for InsightConfig {
    fn default() -> Self {
        InsightConfig {
            sample_size: 10,
            correlation_column_cap: CORRELATION_COLUMN_CAP,
            outlier_iqr_multiplier: 1.5,
            min_outlier_values: 4,
            completeness_issue_threshold: 90.0,
            missing_data_threshold: 10.0,
            columns: ColumnKeywords::default(),
            domains: DomainKeywords::default(),
            pipeline: PipelineKeywords::default(),
            intents: IntentKeywords::default(),
            charts: ChartLimits::default(),
        }
    }
}

impl InsightConfig {
    pub fn from_json_str(input: &str) -> Result<Self, MutterError> {
        let config: InsightConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MutterError> {
        let input = std::fs::read_to_string(path)?;
        InsightConfig::from_json_str(&input)
    }

    fn validate(&self) -> Result<(), MutterError> {
        if self.sample_size == 0 {
            return Err(MutterError::Config("sample_size must be at least 1".into()));
        }
        if !(self.outlier_iqr_multiplier.is_finite() && self.outlier_iqr_multiplier >= 0.0) {
            return Err(MutterError::Config(
                "outlier_iqr_multiplier must be a non-negative number".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.domains.analytics_numeric_ratio) {
            return Err(MutterError::Config(
                "analytics_numeric_ratio must lie within [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// True when any keyword occurs in the lowercased haystack.
pub fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = InsightConfig::default();
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.correlation_column_cap, 3);
        assert_eq!(config.min_outlier_values, 4);
        assert_eq!(config.columns.date, vec!["date", "time", "created", "updated"]);
        assert_eq!(config.charts.top_n, 5);
    }

    #[test]
    fn test_partial_json_overrides_only_named_keys() {
        let config = InsightConfig::from_json_str(
            r#"{"correlation_column_cap": 5, "columns": {"date": ["when"]}}"#,
        )
        .unwrap();
        assert_eq!(config.correlation_column_cap, 5);
        assert_eq!(config.columns.date, vec!["when"]);
        assert_eq!(config.columns.geo, words(GEO_KEYWORDS));
        assert_eq!(config.sample_size, 10);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            InsightConfig::from_json_str(r#"{"sample_size": 0}"#),
            Err(MutterError::Config(_))
        ));
    }
}
