use crate::analysis::AnalysisResult;
use crate::config::{InsightConfig, IntentKeywords, contains_any};
use crate::correlation::Strength;
use crate::dataset::Dataset;
use crate::distribution::lead_pipeline;
use crate::domain::DomainLabel;
use crate::format::{Bindings, Template, list};
use crate::stats::Skew;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// What the user is asking for. Checked in declaration order; the first
/// keyword hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Deep,
    TopPerformers,
    Pattern,
    Problem,
    Summary,
    Structure,
}

impl Intent {
    pub fn classify(query: &str, keywords: &IntentKeywords) -> Self {
        let query = query.to_lowercase();
        [
            (Intent::Deep, &keywords.deep),
            (Intent::TopPerformers, &keywords.top),
            (Intent::Pattern, &keywords.pattern),
            (Intent::Problem, &keywords.problem),
            (Intent::Summary, &keywords.summary),
            (Intent::Structure, &keywords.structure),
        ]
        .into_iter()
        .find(|(_, words)| contains_any(&query, words))
        .map_or(Intent::Summary, |(intent, _)| intent)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intent::Deep => "deep",
            Intent::TopPerformers => "top performers",
            Intent::Pattern => "pattern",
            Intent::Problem => "problem",
            Intent::Summary => "summary",
            Intent::Structure => "structure",
        })
    }
}

const FALLBACK: Template = Template::new(
    "I'm analyzing your {file} with {rows} rows. Let me process this data and provide insights based on your query: \"{query}\".",
);

const DEEP: Template = Template::new(
    "Deep analysis of {file} with {rows} records reveals: {insights}. I can dive deeper into statistical distributions, outlier detection, or correlation analysis. What specific area interests you?",
);
const DEEP_SHEETS: Template = Template::new("Workbook contains {sheets} sheets, analyzing the primary sheet");
const DEEP_RANGE: Template =
    Template::new("{metric} ranges from {min} to {max} with average {mean}");
const DEEP_SPREAD: Template = Template::new(
    "{metric} ranges from {min} to {max} with average {mean} and standard deviation {std}",
);
const DEEP_MEDIAN: Template =
    Template::new("Median {metric} is {median}, indicating a {skew} distribution");
const DEEP_OUTLIERS: Template = Template::new(
    "{count} values in {metric} ({share}%) fall outside the expected range of {lower} to {upper}",
);
const DEEP_CORRELATION: Template =
    Template::new("Strongest relationship is {left} and {right} ({strength}, r = {r})");
const DEEP_CATEGORIES: Template =
    Template::new("Found {count} categorical dimensions: {names}");
const DEEP_DATES: Template =
    Template::new("Detected {count} date columns for time-series analysis");
const DEEP_PEAK: Template =
    Template::new("Activity peaks on {day} with {share}% of dated records");
const DEEP_DUPLICATES: Template =
    Template::new("{count} duplicate records make up {share}% of rows");
const DEEP_TEXT: Template =
    Template::new("Free-text fields read {sentiment} overall, with recurring topics {topics}");
const DEEP_ISSUES: Template = Template::new("Data quality concerns in {count} columns");

const TOP_NO_METRIC: Template = Template::new(
    "Your {file} doesn't have numeric performance metrics. I can analyze categorical patterns or text-based insights instead. Available dimensions: {dimensions}. What would you like to explore?",
);
const TOP_UNKNOWN_STATS: Template = Template::new(
    "Analyzing top {noun} in your {file} across {count} metrics. Which specific performance indicator should I focus on: {metrics}?",
);
const TOP: Template = Template::new(
    "Top {noun} in {file} based on {metric}: excellent performers score above {excellent} and strong performers above {strong} (average is {mean}, maximum is {max}). ",
);
const TOP_ABOVE: Template =
    Template::new("{above} of {count} {noun} ({share}%) clear the excellent mark. ");
const TOP_STANDARDIZED: Template = Template::new(
    "I notice {metric} has {unique} unique values, suggesting some standardized scoring. ",
);
const TOP_CLOSING: &str = "Would you like me to identify specific top performers or analyze what factors contribute to high performance?";

const PATTERN: Template = Template::new(
    "Pattern analysis of {file}: {patterns}. I can explore seasonal trends, performance correlations, or categorical clustering. Which pattern would you like me to investigate further?",
);
const PATTERN_NONE: Template = Template::new(
    "Analyzing patterns in {file} with {rows} records. I can identify trends, correlations, and behavioral patterns across {numeric} numeric and {text} categorical dimensions. What specific pattern are you looking for?",
);
const PATTERN_CORRELATION: Template =
    Template::new("{strength} {direction} relationship between {left} and {right} (r = {r})");
const PATTERN_WEAK: Template = Template::new(
    "No strong relationships among {columns}, the strongest is r = {r}",
);
const PATTERN_CATEGORY: Template = Template::new(
    "{value} dominates {column} with {share}% of records, which may shape {metric}",
);
const PATTERN_PEAK: Template =
    Template::new("{column} activity peaks on {day} ({share}% of dated records)");
const PATTERN_DATES: Template = Template::new("Time-based trends available through {column}");
const PATTERN_SKEW: Template = Template::new("{metric} is {skew} (skewness {value})");

const PROBLEM: Template = Template::new(
    "Problem analysis of {file} identified: {issues}. I can provide specific recommendations for addressing these issues. Which problem should we tackle first?",
);
const PROBLEM_NONE: Template = Template::new(
    "Problem analysis of {file}: No major data quality or performance issues detected. Overall data quality score: {score}%. The dataset appears healthy with {rows} records. Would you like me to look for subtle patterns or potential improvement areas?",
);
const PROBLEM_MISSING: Template = Template::new("{column} has {share}% missing data");
const PROBLEM_CONSTANT: Template = Template::new("{column} contains only one unique value");
const PROBLEM_OUTLIERS: Template =
    Template::new("{column} has {count} outliers ({share}% of values)");
const PROBLEM_DUPLICATES: Template = Template::new("{count} duplicate records ({share}%)");
const PROBLEM_TYPES: Template =
    Template::new("only {share}% of columns hold a consistent value type");
/// Issues named in one problem narration.
const PROBLEM_LIMIT: usize = 3;

const SUMMARY: Template = Template::new(
    "Analysis summary of {file}: {parts}.{key_insights} I can provide deeper insights on performance trends, outlier detection, correlation analysis, or predictive patterns. What would you like to explore?",
);
const SUMMARY_SHAPE: Template =
    Template::new("{rows} records with {numeric} numeric and {text} categorical columns");
const SUMMARY_DATES: Template = Template::new("{count} date columns for temporal analysis");
const SUMMARY_METRIC: Template = Template::new("primary metric {metric} averages {mean}");
const SUMMARY_QUALITY: Template = Template::new("data quality score {score}%");
const SUMMARY_SHEETS: Template = Template::new("workbook with {sheets} sheets");
const SUMMARY_SENTIMENT: Template = Template::new("free-text sentiment is {sentiment}");
const KEY_INSIGHTS: Template = Template::new(" Key insights: {facts}.");

const LEAD_SOURCE: Template =
    Template::new("{source} is the leading source at {share}% across {count} sources");
const LEAD_QUALIFIED: Template = Template::new("{share}% of leads are qualified or converted");
const LEAD_REACH: Template = Template::new("leads span {count} locations led by {places}");
const LEAD_SCORE: Template = Template::new(
    "{share}% of leads are high value, above 1.2 times the average score of {avg}",
);

const STRUCTURE: Template = Template::new(
    "Data structure of {file}: {parts}. Each column has been analyzed for data type, completeness, and statistical properties. Which specific column would you like me to examine in detail?",
);
const STRUCTURE_GROUP: Template = Template::new("{kind} columns ({count}): {names}");
const STRUCTURE_SAMPLE: Template = Template::new("Sample {column} values: {values}");

/// Renders one narration per query from a finished analysis. Pure over its
/// inputs, so the same query and dataset always produce the same text.
pub struct InsightNarrator<'a> {
    config: &'a InsightConfig,
}

struct Scene<'n> {
    dataset: &'n Dataset,
    analysis: &'n AnalysisResult,
    domain: DomainLabel,
    config: &'n InsightConfig,
}

impl<'a> InsightNarrator<'a> {
    pub fn new(config: &'a InsightConfig) -> Self {
        InsightNarrator { config }
    }

    pub fn narrate(
        &self,
        query: &str,
        dataset: &Dataset,
        analysis: &AnalysisResult,
        domain: DomainLabel,
    ) -> String {
        let intent = Intent::classify(query, &self.config.intents);
        debug!(%intent, %domain, "narrating query");
        self.render(intent, dataset, analysis, domain)
    }

    pub fn render(
        &self,
        intent: Intent,
        dataset: &Dataset,
        analysis: &AnalysisResult,
        domain: DomainLabel,
    ) -> String {
        let scene = Scene {
            dataset,
            analysis,
            domain,
            config: self.config,
        };
        match intent {
            Intent::Deep => scene.deep(),
            Intent::TopPerformers => scene.top_performers(),
            Intent::Pattern => scene.pattern(),
            Intent::Problem => scene.problem(),
            Intent::Summary => scene.summary(),
            Intent::Structure => scene.structure(),
        }
    }
}

/// Narration for input that cannot be analyzed at all.
pub fn fallback(file_name: &str, rows: usize, query: &str) -> String {
    FALLBACK.render(
        &Bindings::new()
            .text("file", file_name)
            .count("rows", rows)
            .text("query", query),
    )
}

fn domain_noun(domain: DomainLabel) -> &'static str {
    match domain {
        DomainLabel::LeadManagement => "leads",
        DomainLabel::Sales => "sales records",
        DomainLabel::Academic => "students",
        DomainLabel::Hr => "employees",
        DomainLabel::Financial => "line items",
        DomainLabel::ContactCrm => "contacts",
        DomainLabel::Analytics | DomainLabel::Business => "performers",
    }
}

impl Scene<'_> {
    fn base(&self) -> Bindings {
        Bindings::new()
            .text("file", self.analysis.file_name.as_str())
            .count("rows", self.analysis.row_count)
    }

    fn deep(&self) -> String {
        let analysis = self.analysis;
        let mut insights = Vec::new();

        if analysis.sheet_names.len() > 1 {
            insights.push(DEEP_SHEETS.render(&Bindings::new().count("sheets", analysis.sheet_names.len())));
        }

        if let Some(metric) = analysis.primary_metric() {
            if let Some(stats) = analysis.numeric_stats(metric) {
                let bindings = Bindings::new()
                    .text("metric", metric)
                    .stat("min", stats.min)
                    .stat("max", stats.max)
                    .stat("mean", stats.mean)
                    .stat("median", stats.median);
                match stats.std_dev {
                    Some(std) => insights.push(DEEP_SPREAD.render(&bindings.clone().stat("std", std))),
                    None => insights.push(DEEP_RANGE.render(&bindings)),
                }
                if let Some(skew) = stats.skew() {
                    insights.push(DEEP_MEDIAN.render(&bindings.text("skew", skew.to_string())));
                }
            }
            if let Some(report) = analysis.outliers.get(metric).filter(|r| r.count > 0) {
                if let (Some(lower), Some(upper)) = (report.lower_bound, report.upper_bound) {
                    insights.push(DEEP_OUTLIERS.render(
                        &Bindings::new()
                            .count("count", report.count)
                            .text("metric", metric)
                            .percent("share", report.percentage)
                            .stat("lower", lower)
                            .stat("upper", upper),
                    ));
                }
            }
        }

        if let Some(top) = analysis.correlations.first() {
            insights.push(DEEP_CORRELATION.render(
                &Bindings::new()
                    .text("left", top.left.as_str())
                    .text("right", top.right.as_str())
                    .text("strength", top.strength().to_string())
                    .coefficient("r", top.coefficient),
            ));
        }

        if !analysis.text_columns.is_empty() {
            insights.push(DEEP_CATEGORIES.render(
                &Bindings::new()
                    .count("count", analysis.text_columns.len())
                    .text("names", list(&analysis.text_columns, 3)),
            ));
        }

        if !analysis.date_columns.is_empty() {
            insights.push(DEEP_DATES.render(&Bindings::new().count("count", analysis.date_columns.len())));
            if let Some(peak) = &analysis.distribution.temporal {
                insights.push(DEEP_PEAK.render(
                    &Bindings::new()
                        .text("day", peak.peak_day.as_str())
                        .percent("share", peak.percentage),
                ));
            }
        }

        if analysis.duplicates.count > 0 {
            insights.push(DEEP_DUPLICATES.render(
                &Bindings::new()
                    .count("count", analysis.duplicates.count)
                    .percent("share", analysis.duplicates.percentage),
            ));
        }

        if let Some(text) = analysis.text.as_ref().filter(|t| !t.topics.is_empty()) {
            insights.push(DEEP_TEXT.render(
                &Bindings::new()
                    .text("sentiment", text.sentiment.to_string())
                    .text("topics", list(&text.topics, 3)),
            ));
        }

        let issues = analysis.issue_columns().count();
        if issues > 0 {
            insights.push(DEEP_ISSUES.render(&Bindings::new().count("count", issues)));
        } else {
            insights.push("Excellent data quality across all columns".to_string());
        }

        DEEP.render(&self.base().text("insights", insights.join(". ")))
    }

    fn top_performers(&self) -> String {
        let analysis = self.analysis;
        let noun = domain_noun(self.domain);
        let Some(metric) = analysis.primary_metric() else {
            let dimensions = if analysis.text_columns.is_empty() {
                list(self.dataset.columns(), 3)
            } else {
                list(&analysis.text_columns, 3)
            };
            return TOP_NO_METRIC.render(&self.base().text("dimensions", dimensions));
        };
        let Some(stats) = analysis.numeric_stats(metric) else {
            return TOP_UNKNOWN_STATS.render(
                &self
                    .base()
                    .text("noun", noun)
                    .count("count", analysis.numeric_columns.len())
                    .text("metrics", list(&analysis.numeric_columns, 3)),
            );
        };

        let headroom = stats.max - stats.mean;
        let strong = stats.mean + headroom * 0.3;
        let excellent = stats.mean + headroom * 0.7;
        let mut out = TOP.render(
            &self
                .base()
                .text("noun", noun)
                .text("metric", metric)
                .stat("excellent", excellent)
                .stat("strong", strong)
                .stat("mean", stats.mean)
                .stat("max", stats.max),
        );

        if let Some(idx) = self.dataset.column_index(metric) {
            let values = self.dataset.numeric_values(idx);
            let above = values.iter().filter(|&&v| v > excellent).count();
            if above > 0 {
                out.push_str(&TOP_ABOVE.render(
                    &Bindings::new()
                        .count("above", above)
                        .count("count", values.len())
                        .text("noun", noun)
                        .percent("share", above as f64 / values.len() as f64 * 100.0),
                ));
            }
        }

        if let Some(profile) = analysis.profile(metric) {
            let unique = profile.statistics.unique_count;
            if unique > 0 && (unique as f64) < analysis.row_count as f64 * 0.8 {
                out.push_str(&TOP_STANDARDIZED.render(
                    &Bindings::new().text("metric", metric).count("unique", unique),
                ));
            }
        }

        out.push_str(TOP_CLOSING);
        out
    }

    fn pattern(&self) -> String {
        let analysis = self.analysis;
        let mut patterns = Vec::new();

        let notable: Vec<_> = analysis
            .correlations
            .iter()
            .filter(|c| c.strength() != Strength::Weak)
            .take(2)
            .collect();
        if notable.is_empty() {
            if let Some(strongest) = analysis.correlations.first() {
                let considered: Vec<&String> = analysis
                    .numeric_columns
                    .iter()
                    .take(self.config.correlation_column_cap)
                    .collect();
                patterns.push(PATTERN_WEAK.render(
                    &Bindings::new()
                        .text("columns", list(&considered, considered.len()))
                        .coefficient("r", strongest.coefficient),
                ));
            }
        }
        for correlation in notable {
            let strength = correlation.strength().to_string();
            let mut chars = strength.chars();
            let capitalized = chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default();
            patterns.push(PATTERN_CORRELATION.render(
                &Bindings::new()
                    .text("strength", capitalized)
                    .text(
                        "direction",
                        if correlation.coefficient >= 0.0 { "positive" } else { "negative" },
                    )
                    .text("left", correlation.left.as_str())
                    .text("right", correlation.right.as_str())
                    .coefficient("r", correlation.coefficient),
            ));
        }

        if let (Some((dist, share)), Some(metric)) = (
            analysis.distribution.dominant(analysis.row_count),
            analysis.primary_metric(),
        ) {
            patterns.push(PATTERN_CATEGORY.render(
                &Bindings::new()
                    .text("value", share.value.as_str())
                    .text("column", dist.column.as_str())
                    .percent("share", share.percentage)
                    .text("metric", metric),
            ));
        }

        match &analysis.distribution.temporal {
            Some(peak) => patterns.push(PATTERN_PEAK.render(
                &Bindings::new()
                    .text("column", peak.column.as_str())
                    .text("day", peak.peak_day.as_str())
                    .percent("share", peak.percentage),
            )),
            None => {
                if let Some(column) = analysis.date_columns.first() {
                    patterns.push(PATTERN_DATES.render(&Bindings::new().text("column", column.as_str())));
                }
            }
        }

        if let Some(metric) = analysis.primary_metric() {
            let skewed = analysis.numeric_stats(metric).and_then(|s| {
                s.skewness.zip(s.skew()).filter(|(_, skew)| *skew != Skew::Normal)
            });
            if let Some((value, skew)) = skewed {
                patterns.push(PATTERN_SKEW.render(
                    &Bindings::new()
                        .text("metric", metric)
                        .text("skew", skew.to_string())
                        .stat("value", value),
                ));
            }
        }

        if patterns.is_empty() {
            return PATTERN_NONE.render(
                &self
                    .base()
                    .count("numeric", analysis.numeric_columns.len())
                    .count("text", analysis.text_columns.len()),
            );
        }
        PATTERN.render(&self.base().text("patterns", patterns.join(". ")))
    }

    fn problem(&self) -> String {
        let analysis = self.analysis;
        let mut issues = Vec::new();

        for (column, quality) in analysis.issue_columns() {
            if quality.completeness < self.config.completeness_issue_threshold {
                issues.push(PROBLEM_MISSING.render(
                    &Bindings::new()
                        .text("column", column.as_str())
                        .percent("share", 100.0 - quality.completeness),
                ));
            }
            if quality.single_valued() {
                issues.push(PROBLEM_CONSTANT.render(&Bindings::new().text("column", column.as_str())));
            }
        }

        for (column, report) in analysis.outliers.iter().filter(|(_, r)| r.count > 0) {
            issues.push(PROBLEM_OUTLIERS.render(
                &Bindings::new()
                    .text("column", column.as_str())
                    .count("count", report.count)
                    .percent("share", report.percentage),
            ));
        }

        if analysis.duplicates.count > 0 {
            issues.push(PROBLEM_DUPLICATES.render(
                &Bindings::new()
                    .count("count", analysis.duplicates.count)
                    .percent("share", analysis.duplicates.percentage),
            ));
        }

        if analysis.type_consistency < 100.0 {
            issues.push(PROBLEM_TYPES.render(&Bindings::new().percent("share", analysis.type_consistency)));
        }

        if issues.is_empty() {
            return PROBLEM_NONE.render(&self.base().count("score", analysis.quality_score as usize));
        }
        PROBLEM.render(&self.base().text("issues", list(&issues, PROBLEM_LIMIT)))
    }

    fn summary(&self) -> String {
        let analysis = self.analysis;
        let mut parts = vec![SUMMARY_SHAPE.render(
            &Bindings::new()
                .count("rows", analysis.row_count)
                .count("numeric", analysis.numeric_columns.len())
                .count("text", analysis.text_columns.len()),
        )];
        if !analysis.date_columns.is_empty() {
            parts.push(SUMMARY_DATES.render(&Bindings::new().count("count", analysis.date_columns.len())));
        }
        if let Some(metric) = analysis.primary_metric() {
            if let Some(stats) = analysis.numeric_stats(metric) {
                parts.push(SUMMARY_METRIC.render(
                    &Bindings::new().text("metric", metric).stat("mean", stats.mean),
                ));
            }
        }
        parts.push(SUMMARY_QUALITY.render(&Bindings::new().count("score", analysis.quality_score as usize)));
        if analysis.sheet_names.len() > 1 {
            parts.push(SUMMARY_SHEETS.render(&Bindings::new().count("sheets", analysis.sheet_names.len())));
        }
        if let Some(text) = &analysis.text {
            parts.push(SUMMARY_SENTIMENT.render(
                &Bindings::new().text("sentiment", text.sentiment.to_string()),
            ));
        }

        let key_insights = self
            .key_insights()
            .map(|facts| KEY_INSIGHTS.render(&Bindings::new().text("facts", facts)))
            .unwrap_or_default();
        SUMMARY.render(
            &self
                .base()
                .text("parts", parts.join(", "))
                .text("key_insights", key_insights),
        )
    }

    fn key_insights(&self) -> Option<String> {
        let canned = match self.domain {
            DomainLabel::LeadManagement => return Some(self.lead_facts()),
            DomainLabel::Sales => {
                "revenue analysis is available, with product performance metrics and customer segmentation patterns ready"
            }
            DomainLabel::Academic => {
                "academic performance analysis is available, with grade distribution patterns and improvement opportunities identified"
            }
            DomainLabel::Hr => {
                "workforce metrics are ready, including compensation and department breakdowns"
            }
            DomainLabel::Financial => {
                "financial flows are ready for budget and expense breakdowns"
            }
            DomainLabel::ContactCrm => {
                "contact records are ready for segmentation and outreach planning"
            }
            DomainLabel::Analytics => {
                "the dataset is numeric-heavy and suited to correlation and trend analysis"
            }
            DomainLabel::Business => return None,
        };
        Some(canned.to_string())
    }

    fn lead_facts(&self) -> String {
        let pipeline = lead_pipeline(self.dataset, &self.config.pipeline);
        let mut facts = Vec::new();
        if let Some(top) = pipeline.top_sources.first() {
            facts.push(LEAD_SOURCE.render(
                &Bindings::new()
                    .text("source", top.value.as_str())
                    .percent("share", top.percentage)
                    .count("count", pipeline.source_count),
            ));
        }
        if let Some(rate) = pipeline.qualification_rate {
            facts.push(LEAD_QUALIFIED.render(&Bindings::new().percent("share", rate)));
        }
        if pipeline.location_count > 0 {
            facts.push(LEAD_REACH.render(
                &Bindings::new()
                    .count("count", pipeline.location_count)
                    .text("places", list(&pipeline.top_locations, 3)),
            ));
        }
        if let Some(avg) = pipeline.average_score {
            facts.push(LEAD_SCORE.render(
                &Bindings::new()
                    .percent("share", pipeline.high_value_percentage)
                    .stat("avg", avg),
            ));
        }
        if facts.is_empty() {
            return "lead pipeline analysis shows conversion opportunities and a qualification status distribution ready for review".to_string();
        }
        facts.join(", ")
    }

    fn structure(&self) -> String {
        let analysis = self.analysis;
        let mut parts = Vec::new();
        let groups = [
            ("Numeric", &analysis.numeric_columns, 4),
            ("Text", &analysis.text_columns, 4),
            ("Date", &analysis.date_columns, analysis.date_columns.len()),
        ];
        for (kind, columns, limit) in groups {
            if !columns.is_empty() {
                parts.push(STRUCTURE_GROUP.render(
                    &Bindings::new()
                        .text("kind", kind)
                        .count("count", columns.len())
                        .text("names", list(columns, limit)),
                ));
            }
        }

        let sample_column = analysis
            .numeric_columns
            .first()
            .or_else(|| analysis.text_columns.first());
        if let Some(column) = sample_column {
            if let Some(values) = analysis.sample_values.get(column).filter(|v| !v.is_empty()) {
                parts.push(STRUCTURE_SAMPLE.render(
                    &Bindings::new()
                        .text("column", column.as_str())
                        .text("values", list(values, 3)),
                ));
            }
        }

        STRUCTURE.render(&self.base().text("parts", parts.join(". ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainClassifier;

    fn narrate(query: &str, dataset: &Dataset) -> String {
        let config = InsightConfig::default();
        let analysis = AnalysisResult::build(dataset, &config).unwrap();
        let domain = DomainClassifier::new(&config).classify(
            dataset.columns(),
            Some(dataset.file_name()),
            analysis.numeric_columns.len(),
        );
        InsightNarrator::new(&config).narrate(query, dataset, &analysis, domain)
    }

    fn scores() -> Dataset {
        let rows = [
            ["Ana", "88", "91", "math", "2024-03-04"],
            ["Ben", "72", "70", "math", "2024-03-05"],
            ["Cho", "95", "97", "art", "2024-03-11"],
            ["Dev", "60", "65", "math", "2024-03-18"],
            ["Eli", "81", "", "art", "2024-03-12"],
        ];
        Dataset::from_strings(
            "students.csv",
            vec![
                "student".into(),
                "exam_score".into(),
                "final_grade".into(),
                "subject".into(),
                "exam_date".into(),
            ],
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_intent_priority() {
        let keywords = IntentKeywords::default();
        assert_eq!(Intent::classify("Give me a DEEP dive", &keywords), Intent::Deep);
        assert_eq!(Intent::classify("top trend", &keywords), Intent::TopPerformers);
        assert_eq!(Intent::classify("any correlation issues?", &keywords), Intent::Pattern);
        assert_eq!(Intent::classify("data quality", &keywords), Intent::Problem);
        assert_eq!(Intent::classify("what does each column hold", &keywords), Intent::Structure);
        assert_eq!(Intent::classify("hello", &keywords), Intent::Summary);
        assert_eq!(Intent::classify("", &keywords), Intent::Summary);
    }

    #[test]
    fn test_top_performers_thresholds() {
        let text = narrate("who are the best students", &scores());
        // mean 79.2, max 95 -> strong 83.94, excellent 90.26
        assert!(text.starts_with("Top students in students.csv based on exam_score"));
        assert!(text.contains("above 90.26"));
        assert!(text.contains("above 83.94"));
        assert!(text.contains("average is 79.20"));
        assert!(text.contains("1 of 5 students (20.0%)"));
    }

    #[test]
    fn test_top_without_numeric_columns() {
        let dataset = Dataset::from_strings(
            "people.csv",
            vec!["city".into(), "team".into()],
            vec![vec!["Oslo".into(), "red".into()]],
        );
        let text = narrate("top cities", &dataset);
        assert!(text.contains("doesn't have numeric performance metrics"));
        assert!(text.contains("Available dimensions: city, team"));
    }

    #[test]
    fn test_deep_mentions_spread_and_correlation() {
        let text = narrate("detailed breakdown", &scores());
        assert!(text.starts_with("Deep analysis of students.csv with 5 records reveals: "));
        assert!(text.contains("exam_score ranges from 60.00 to 95.00"));
        assert!(text.contains("Strongest relationship is exam_score and final_grade (strong, r = "));
        assert!(text.contains("Data quality concerns in 1 columns"));
    }

    #[test]
    fn test_pattern_reports_relationships_and_peak() {
        let text = narrate("show me patterns", &scores());
        assert!(text.contains("Strong positive relationship between exam_score and final_grade"));
        assert!(text.contains("math dominates subject with 60.0% of records"));
        assert!(text.contains("exam_date activity peaks on Monday (60.0% of dated records)"));
    }

    #[test]
    fn test_problem_lists_missing_data() {
        let text = narrate("any problems?", &scores());
        assert!(text.starts_with("Problem analysis of students.csv identified: final_grade has 20.0% missing data"));
    }

    #[test]
    fn test_problem_healthy_dataset() {
        let dataset = Dataset::from_strings(
            "clean.csv",
            vec!["id".into(), "label".into()],
            vec![
                vec!["1".into(), "a".into()],
                vec!["2".into(), "b".into()],
            ],
        );
        let text = narrate("quality check", &dataset);
        assert!(text.contains("No major data quality or performance issues detected"));
        assert!(text.contains("Overall data quality score: 100%"));
    }

    #[test]
    fn test_summary_has_domain_insight() {
        let text = narrate("overview please", &scores());
        assert!(text.starts_with("Analysis summary of students.csv: 5 records with 2 numeric and 2 categorical columns"));
        assert!(text.contains("primary metric exam_score averages 79.20"));
        assert!(text.contains("Key insights: academic performance analysis"));
    }

    #[test]
    fn test_structure_lists_columns() {
        let text = narrate("which fields exist", &scores());
        assert!(text.contains("Numeric columns (2): exam_score, final_grade"));
        assert!(text.contains("Date columns (1): exam_date"));
        assert!(text.contains("Sample exam_score values: 88, 72, 95"));
    }

    #[test]
    fn test_fallback_text() {
        assert_eq!(
            fallback("x.csv", 0, "hi"),
            "I'm analyzing your x.csv with 0 rows. Let me process this data and provide insights based on your query: \"hi\"."
        );
    }
}
