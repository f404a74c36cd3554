use mutter::{Dataset, DomainLabel, InsightEngine, analyze, select_charts};
use std::fs;
use std::path::PathBuf;

const SOURCES: [&str; 4] = ["web", "referral", "ads", "event"];
const STATUSES: [&str; 4] = ["new", "qualified", "contacted", "won"];

fn lead_rows() -> Vec<Vec<String>> {
    (0..100)
        .map(|i| {
            vec![
                format!("Lead {i}"),
                SOURCES[i % 4].to_string(),
                (1000 + (i % 10) * 100).to_string(),
                STATUSES[i % 4].to_string(),
            ]
        })
        .collect()
}

fn lead_columns() -> Vec<String> {
    ["name", "source", "deal_value", "status"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn write_leads_csv() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mutter-narration-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("leads.csv");
    let mut body = lead_columns().join(",");
    body.push('\n');
    for row in lead_rows() {
        body.push_str(&row.join(","));
        body.push('\n');
    }
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn top_performers_on_leads_csv() {
    let path = write_leads_csv();
    let dataset = Dataset::from_csv(&path).unwrap();
    assert_eq!(dataset.file_name(), "leads.csv");
    assert_eq!(dataset.row_count(), 100);

    let text = analyze("show me top performers", &dataset);
    // deal_value cycles 1000..=1900: mean 1450, max 1900.
    assert!(text.starts_with("Top leads in leads.csv based on deal_value"), "{text}");
    assert!(text.contains("above 1765.00"), "{text}");
    assert!(text.contains("above 1585.00"), "{text}");
    assert!(text.contains("average is 1450.00, maximum is 1900.00"), "{text}");
    assert!(text.contains("deal_value has 10 unique values"), "{text}");
    assert!(!text.contains('{'), "{text}");

    fs::remove_file(path).ok();
}

#[test]
fn narration_is_idempotent() {
    let dataset = Dataset::from_strings("leads.csv", lead_columns(), lead_rows());
    for query in ["show me top performers", "deep dive", "patterns", "problems", "columns", ""] {
        assert_eq!(analyze(query, &dataset), analyze(query, &dataset));
    }
    assert_eq!(select_charts(&dataset), select_charts(&dataset));
}

#[test]
fn lead_summary_reports_pipeline() {
    let dataset = Dataset::from_strings("leads.csv", lead_columns(), lead_rows());
    let engine = InsightEngine::default();
    let analysis = engine.profile(&dataset).unwrap();
    assert_eq!(engine.classify(&dataset, &analysis), DomainLabel::LeadManagement);

    let text = engine.analyze("give me an overview", &dataset);
    assert!(text.starts_with("Analysis summary of leads.csv: 100 records with 1 numeric and 3 categorical columns"), "{text}");
    assert!(text.contains("web is the leading source at 25.0% across 4 sources"), "{text}");
    assert!(text.contains("50.0% of leads are qualified or converted"), "{text}");
    assert!(text.contains("20.0% of leads are high value"), "{text}");
}

#[test]
fn malformed_input_falls_back() {
    let empty = Dataset::new("empty.csv", vec![], vec![]);
    let text = analyze("top performers", &empty);
    assert_eq!(
        text,
        "I'm analyzing your empty.csv with 0 rows. Let me process this data and provide insights based on your query: \"top performers\"."
    );
    assert!(select_charts(&empty).is_empty());
}

#[test]
fn stored_document_with_metadata() {
    let document = r#"{
        "fileName": "students.xlsx",
        "fileType": "xlsx",
        "columns": ["student", "score"],
        "data": [
            {"student": "Ana", "score": 91},
            {"student": "Ben", "score": 78},
            {"student": "Cho", "score": null}
        ],
        "metadata": {
            "dataTypes": {"student": "string", "score": "number"},
            "statistics": {
                "score": {"min": 78, "max": 91, "avg": 84.5, "median": 91, "nullCount": 1, "uniqueCount": 2}
            },
            "sampleValues": {"score": [91, 78]},
            "sheetNames": ["Grades", "Notes"]
        }
    }"#;
    let dataset = Dataset::from_json(document, "upload.json").unwrap();
    assert_eq!(dataset.file_type(), "xlsx");

    let text = analyze("summary", &dataset);
    assert!(text.contains("primary metric score averages 84.50"), "{text}");
    assert!(text.contains("workbook with 2 sheets"), "{text}");

    let deep = analyze("comprehensive review", &dataset);
    assert!(deep.contains("Workbook contains 2 sheets"), "{deep}");
}

#[test]
fn charts_for_leads() {
    let dataset = Dataset::from_strings("leads.csv", lead_columns(), lead_rows());
    let charts = select_charts(&dataset);
    assert_eq!(charts.len(), 2);
    assert_eq!(charts[0].title, "Top 5 by deal_value");
    assert_eq!(charts[1].title, "source Distribution");
    let url = charts[0].chart_url("https://quickchart.io/chart", 600, 400);
    assert!(url.starts_with("https://quickchart.io/chart?c=%7B%22type%22%3A%22bar%22"));
    assert!(url.ends_with("&width=600&height=400&devicePixelRatio=2"));
}

#[test]
fn extreme_magnitudes_narrate_finite_numbers() {
    let dataset = Dataset::from_strings(
        "extremes.csv",
        vec!["v".into()],
        ["1e308", "-1e308", "1e308", "5"]
            .iter()
            .map(|v| vec![v.to_string()])
            .collect(),
    );
    let stats = InsightEngine::default().profile(&dataset).unwrap();
    let v = stats.numeric_stats("v").unwrap();
    assert!(v.min <= v.mean && v.mean <= v.max);

    for query in ["top performers", "summary", "deep dive", "patterns", "problems", "columns"] {
        let text = analyze(query, &dataset);
        assert!(!text.contains("NaN"), "{text}");
        assert!(!text.contains("inf"), "{text}");
    }
    assert!(analyze("summary", &dataset).contains("primary metric v averages 2.50e307"));
}
