use crate::analysis::AnalysisResult;
use crate::config::{ChartLimits, contains_any};
use crate::dataset::Dataset;
use crate::distribution::value_distribution;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::fmt;

pub const PALETTE: [&str; 6] = ["#EA580C", "#FB923C", "#FED7AA", "#FDBA74", "#F97316", "#C2410C"];

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const BAR_LABEL_CHARS: usize = 15;
const SLICE_LABEL_CHARS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Bar => "bar",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Line => "line",
        })
    }
}

/// A chart configuration ready for an external chart-image service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub title: String,
    pub description: String,
    pub config: Value,
}

impl ChartArtifact {
    pub fn chart_url(&self, base: &str, width: u32, height: u32) -> String {
        let encoded = utf8_percent_encode(&self.config.to_string(), URI_COMPONENT).to_string();
        format!("{base}?c={encoded}&width={width}&height={height}&devicePixelRatio=2")
    }
}

fn truncate(label: &str, max_chars: usize) -> String {
    label.chars().take(max_chars).collect()
}

fn title_plugin(text: &str) -> Value {
    json!({
        "display": true,
        "text": text,
        "font": { "size": 16, "weight": "bold" }
    })
}

fn value_axes() -> Value {
    json!({
        "y": { "beginAtZero": true, "grid": { "color": "#E5E7EB" } },
        "x": { "grid": { "display": false } }
    })
}

pub struct ChartSelector<'a> {
    limits: &'a ChartLimits,
}

impl<'a> ChartSelector<'a> {
    pub fn new(limits: &'a ChartLimits) -> Self {
        ChartSelector { limits }
    }

    /// Up to three charts in a fixed order: top-N bar, category doughnut, trend
    /// line. Each is skipped when its data is not there.
    pub fn select(&self, dataset: &Dataset, analysis: &AnalysisResult) -> Vec<ChartArtifact> {
        [
            self.top_bar(dataset, analysis),
            self.category_doughnut(dataset, analysis),
            self.trend_line(dataset, analysis),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn top_bar(&self, dataset: &Dataset, analysis: &AnalysisResult) -> Option<ChartArtifact> {
        let metric = analysis.primary_metric()?;
        let metric_idx = dataset.column_index(metric)?;
        let label_idx = dataset
            .columns()
            .iter()
            .position(|c| contains_any(&c.to_lowercase(), &self.limits.label_keywords));

        let mut ranked: Vec<(usize, f64)> = dataset
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row[metric_idx].as_number().map(|v| (i, v)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(self.limits.top_n);
        if ranked.is_empty() {
            return None;
        }

        let labels: Vec<String> = ranked
            .iter()
            .enumerate()
            .map(|(position, (row_idx, _))| match label_idx {
                Some(idx) => truncate(&dataset.rows()[*row_idx][idx].label(), BAR_LABEL_CHARS),
                None => format!("Item {}", position + 1),
            })
            .collect();
        let values: Vec<f64> = ranked.iter().map(|(_, v)| *v).collect();
        let title = format!("Top {} by {metric}", self.limits.top_n);

        Some(ChartArtifact {
            kind: ChartKind::Bar,
            config: json!({
                "type": "bar",
                "data": {
                    "labels": labels,
                    "datasets": [{
                        "label": metric,
                        "data": values,
                        "backgroundColor": &PALETTE[..5],
                        "borderColor": PALETTE[0],
                        "borderWidth": 2
                    }]
                },
                "options": {
                    "responsive": true,
                    "plugins": { "title": title_plugin(&title), "legend": { "display": false } },
                    "scales": value_axes()
                }
            }),
            description: format!("Highest performing items based on {metric} values"),
            title,
        })
    }

    fn category_doughnut(&self, dataset: &Dataset, analysis: &AnalysisResult) -> Option<ChartArtifact> {
        let column = analysis.text_columns.iter().find(|c| {
            analysis.profile(c).is_some_and(|p| {
                let distinct = p.statistics.unique_count;
                distinct > 1 && distinct <= self.limits.category_max_distinct
            })
        })?;
        let idx = dataset.column_index(column)?;
        let mut slices = value_distribution(dataset.column(idx));
        slices.truncate(self.limits.doughnut_max_slices);
        if slices.len() < 2 {
            return None;
        }

        let labels: Vec<String> = slices
            .iter()
            .map(|s| truncate(&s.value, SLICE_LABEL_CHARS))
            .collect();
        let counts: Vec<usize> = slices.iter().map(|s| s.count).collect();
        let title = format!("{column} Distribution");

        Some(ChartArtifact {
            kind: ChartKind::Doughnut,
            config: json!({
                "type": "doughnut",
                "data": {
                    "labels": labels,
                    "datasets": [{
                        "data": counts,
                        "backgroundColor": PALETTE,
                        "borderWidth": 2,
                        "borderColor": "#FFFFFF"
                    }]
                },
                "options": {
                    "responsive": true,
                    "plugins": {
                        "title": title_plugin(&title),
                        "legend": { "position": "right", "labels": { "font": { "size": 12 } } }
                    }
                }
            }),
            description: format!("Breakdown of data by {column} categories"),
            title,
        })
    }

    fn trend_line(&self, dataset: &Dataset, analysis: &AnalysisResult) -> Option<ChartArtifact> {
        let date_column = analysis.date_columns.first()?;
        let metric = analysis.primary_metric()?;
        let (date_idx, metric_idx) = (dataset.column_index(date_column)?, dataset.column_index(metric)?);

        let mut points: Vec<_> = dataset
            .rows()
            .iter()
            .filter_map(|row| Some((row[date_idx].as_date()?, row[metric_idx].as_number()?)))
            .collect();
        points.sort_by_key(|(date, _)| *date);
        points.truncate(self.limits.trend_max_points);
        if points.len() <= 2 {
            return None;
        }

        let labels: Vec<String> = points
            .iter()
            .map(|(date, _)| date.format("%Y-%m-%d").to_string())
            .collect();
        let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let title = format!("{metric} Trend Over Time");

        Some(ChartArtifact {
            kind: ChartKind::Line,
            config: json!({
                "type": "line",
                "data": {
                    "labels": labels,
                    "datasets": [{
                        "label": metric,
                        "data": values,
                        "borderColor": PALETTE[0],
                        "backgroundColor": "rgba(234, 88, 12, 0.1)",
                        "borderWidth": 3,
                        "fill": true,
                        "tension": 0.4
                    }]
                },
                "options": {
                    "responsive": true,
                    "plugins": { "title": title_plugin(&title), "legend": { "display": false } },
                    "scales": value_axes()
                }
            }),
            title: format!("{metric} Trend"),
            description: format!("Time-based trend analysis of {metric}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;

    fn orders() -> Dataset {
        let rows = [
            ["home", "Lamp", "40", "2024-02-03"],
            ["office", "Desk", "250", "2024-02-01"],
            ["office", "Chair with extra padding", "120", "2024-02-02"],
            ["home", "Rug", "90", ""],
            ["office", "Pen", "3", "2024-02-05"],
            ["kitchen", "Mug", "12", "2024-02-04"],
        ];
        Dataset::from_strings(
            "orders.csv",
            vec![
                "department".into(),
                "product_name".into(),
                "price".into(),
                "order_date".into(),
            ],
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    fn select(dataset: &Dataset) -> Vec<ChartArtifact> {
        let config = InsightConfig::default();
        let analysis = AnalysisResult::build(dataset, &config).unwrap();
        ChartSelector::new(&config.charts).select(dataset, &analysis)
    }

    #[test]
    fn test_selects_all_three_in_order() {
        let charts = select(&orders());
        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Bar, ChartKind::Doughnut, ChartKind::Line]);
    }

    #[test]
    fn test_top_bar_ranks_and_truncates_labels() {
        let charts = select(&orders());
        let bar = &charts[0];
        assert_eq!(bar.title, "Top 5 by price");
        assert_eq!(
            bar.config["data"]["labels"],
            json!(["Desk", "Chair with extr", "Rug", "Lamp", "Mug"])
        );
        assert_eq!(bar.config["data"]["datasets"][0]["data"][0], json!(250.0));
    }

    #[test]
    fn test_doughnut_counts_categories() {
        let charts = select(&orders());
        let doughnut = &charts[1];
        assert_eq!(doughnut.title, "department Distribution");
        assert_eq!(doughnut.config["data"]["labels"], json!(["office", "home", "kitchen"]));
        assert_eq!(doughnut.config["data"]["datasets"][0]["data"], json!([3, 2, 1]));
    }

    #[test]
    fn test_trend_sorted_by_date() {
        let charts = select(&orders());
        let line = &charts[2];
        assert_eq!(line.title, "price Trend");
        let labels = &line.config["data"]["labels"];
        assert_eq!(labels[0], json!("2024-02-01"));
        assert_eq!(labels[4], json!("2024-02-05"));
        assert_eq!(line.config["data"]["datasets"][0]["data"][0], json!(250.0));
    }

    fn kinds(dataset: &Dataset) -> Vec<ChartKind> {
        select(dataset).iter().map(|c| c.kind).collect()
    }

    fn segmented(distinct: usize) -> Dataset {
        Dataset::from_strings(
            "segments.csv",
            vec!["segment".into(), "price".into()],
            (0..12)
                .map(|i| vec![format!("s{}", i % distinct), (10 + i).to_string()])
                .collect(),
        )
    }

    /// `points` daily rows, newest first, starting 2024-01-01.
    fn dated(points: usize) -> Dataset {
        Dataset::from_strings(
            "daily.csv",
            vec!["order_date".into(), "price".into()],
            (1..=points)
                .rev()
                .map(|day| vec![format!("2024-01-{day:02}"), (day * 10).to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_doughnut_cardinality_bounds() {
        assert_eq!(kinds(&segmented(1)), vec![ChartKind::Bar]);
        assert_eq!(kinds(&segmented(2)), vec![ChartKind::Bar, ChartKind::Doughnut]);
        assert_eq!(kinds(&segmented(10)), vec![ChartKind::Bar, ChartKind::Doughnut]);
        assert_eq!(kinds(&segmented(11)), vec![ChartKind::Bar]);
    }

    #[test]
    fn test_trend_needs_three_points() {
        assert_eq!(kinds(&dated(2)), vec![ChartKind::Bar]);
        assert_eq!(kinds(&dated(3)), vec![ChartKind::Bar, ChartKind::Line]);
    }

    #[test]
    fn test_trend_keeps_earliest_twenty() {
        let charts = select(&dated(25));
        let line = charts.iter().find(|c| c.kind == ChartKind::Line).unwrap();
        let labels = line.config["data"]["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 20);
        assert_eq!(labels[0], json!("2024-01-01"));
        assert_eq!(labels[19], json!("2024-01-20"));
        assert_eq!(line.config["data"]["datasets"][0]["data"][0], json!(10.0));
    }

    #[test]
    fn test_unlabeled_bars_and_missing_charts() {
        let dataset = Dataset::from_strings(
            "m.csv",
            vec!["reading".into()],
            vec![vec!["1".into()], vec!["5".into()], vec!["3".into()]],
        );
        let charts = select(&dataset);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].config["data"]["labels"], json!(["Item 1", "Item 2", "Item 3"]));
    }

    #[test]
    fn test_chart_url_encoding() {
        let artifact = ChartArtifact {
            kind: ChartKind::Bar,
            title: "t".into(),
            description: "d".into(),
            config: json!({"type": "bar", "label": "a b"}),
        };
        assert_eq!(
            artifact.chart_url("https://quickchart.io/chart", 600, 400),
            "https://quickchart.io/chart?c=%7B%22type%22%3A%22bar%22%2C%22label%22%3A%22a%20b%22%7D&width=600&height=400&devicePixelRatio=2"
        );
    }
}
