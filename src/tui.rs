use crate::analysis::{AnalysisResult, ColumnProfile};
use crate::charts::ChartArtifact;
use crate::config::ChartLimits;
use crate::format::{coefficient, percent, stat};
use crate::MutterError;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use serde::Serialize;
use std::io;
use std::path::Path;

const TAB_TITLES: [&str; 5] = ["Columns", "Quality", "Correlations", "Charts", "Narration"];
const EXPORT_PATH: &str = "mutter_analysis.json";
const COLUMN_HEADERS: [&str; 10] = [
    "Column", "Type", "Role", "Mean", "Median", "StdDev", "Min", "Max", "Nulls", "Unique",
];
const COLUMN_WIDTHS: [u16; 10] = [18, 9, 11, 10, 10, 10, 10, 10, 7, 7];

#[derive(Serialize)]
struct Export<'a> {
    analysis: &'a AnalysisResult,
    narration: &'a str,
    charts: &'a [ChartArtifact],
}

impl Export<'_> {
    fn write_to(&self, path: &Path) -> Result<(), MutterError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn terminal_error(e: io::Error) -> MutterError {
    MutterError::Terminal(e.to_string())
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), stat)
}

fn column_cells(profile: &ColumnProfile) -> Vec<String> {
    let numeric = profile.statistics.numeric.as_ref();
    vec![
        profile.name.clone(),
        format!("{:?}", profile.inferred_type),
        profile
            .domain_role
            .map_or_else(|| "-".to_string(), |r| format!("{r:?}")),
        or_na(numeric.map(|n| n.mean)),
        or_na(numeric.map(|n| n.median)),
        or_na(numeric.and_then(|n| n.std_dev)),
        or_na(numeric.map(|n| n.min)),
        or_na(numeric.map(|n| n.max)),
        profile.statistics.null_count.to_string(),
        profile.statistics.unique_count.to_string(),
    ]
}

fn labeled(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(color)),
        Span::raw(value),
    ])
}

fn quality_lines(analysis: &AnalysisResult) -> Vec<Line<'static>> {
    let mut lines = vec![
        labeled("Quality score", format!("{}%", analysis.quality_score), Color::Magenta),
        labeled(
            "Completeness",
            format!("{}%", percent(analysis.missing.overall_completeness)),
            Color::Magenta,
        ),
        labeled(
            "Type consistency",
            format!("{}%", percent(analysis.type_consistency)),
            Color::Magenta,
        ),
        labeled(
            "Duplicates",
            format!(
                "{} ({}%)",
                analysis.duplicates.count,
                percent(analysis.duplicates.percentage)
            ),
            Color::Blue,
        ),
        labeled(
            "Problematic",
            if analysis.missing.problematic.is_empty() {
                "None".to_string()
            } else {
                analysis.missing.problematic.join(", ")
            },
            Color::Red,
        ),
        Line::from(""),
    ];
    for (column, quality) in &analysis.data_quality {
        let color = if quality.has_issues { Color::Red } else { Color::Green };
        lines.push(labeled(
            column,
            format!(
                "complete {}%, unique {}%",
                percent(quality.completeness),
                percent(quality.uniqueness)
            ),
            color,
        ));
    }
    for (column, report) in analysis.outliers.iter().filter(|(_, r)| r.count > 0) {
        lines.push(labeled(
            &format!("{column} outliers"),
            format!("{} ({}%)", report.count, percent(report.percentage)),
            Color::Yellow,
        ));
    }
    lines
}

fn chart_lines(charts: &[ChartArtifact], limits: &ChartLimits) -> Vec<Line<'static>> {
    if charts.is_empty() {
        return vec![Line::from("No chart fits this dataset")];
    }
    let mut lines = Vec::new();
    for chart in charts {
        lines.push(Line::from(Span::styled(
            chart.title.clone(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(chart.description.clone()));
        lines.push(Line::from(chart.chart_url(&limits.base_url, limits.width, limits.height)));
        lines.push(Line::from(""));
    }
    lines
}

fn thick_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(Color::Cyan))
}

/// Interactive view of one analysis. Blocks until the user presses `q`.
pub fn render_tui(
    analysis: &AnalysisResult,
    narration: &str,
    charts: &[ChartArtifact],
    limits: &ChartLimits,
) -> Result<(), MutterError> {
    enable_raw_mode().map_err(terminal_error)?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(terminal_error)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(terminal_error)?;

    let column_rows: Vec<Vec<String>> = analysis.profiles.values().map(column_cells).collect();
    let quality = quality_lines(analysis);
    let chart_text = chart_lines(charts, limits);
    let mut tab_index = 0usize;
    let mut column_state = TableState::default();
    let mut corr_state = TableState::default();
    let mut v_scroll = 0u16;
    let mut status = String::new();

    loop {
        terminal
            .draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .margin(1)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Min(8),
                        Constraint::Length(3),
                    ])
                    .split(f.area());

                let title = Paragraph::new(format!(
                    "mutter | {} | {} rows, {} columns",
                    analysis.file_name, analysis.row_count, analysis.column_count
                ))
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
                f.render_widget(title, chunks[0]);

                let tabs = Tabs::new(TAB_TITLES.iter().map(|t| t.to_string()).collect::<Vec<_>>())
                    .select(tab_index)
                    .style(Style::default().fg(Color::White))
                    .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                    .divider("|");
                f.render_widget(tabs, chunks[1]);

                let content_area = chunks[2];
                match tab_index {
                    0 => {
                        let rows: Vec<Row> = column_rows.iter().map(|cells| Row::new(cells.clone())).collect();
                        let header = Row::new(COLUMN_HEADERS.to_vec()).style(Style::default().fg(Color::Green));
                        let table = Table::new(rows, COLUMN_WIDTHS.iter().map(|&w| Constraint::Length(w)))
                            .header(header)
                            .block(thick_block("Columns"))
                            .column_spacing(1)
                            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                            .style(Style::default().fg(Color::White));
                        f.render_stateful_widget(table, content_area, &mut column_state);
                    }
                    1 => {
                        let block = Paragraph::new(quality.clone())
                            .block(thick_block("Quality"))
                            .style(Style::default().fg(Color::White))
                            .scroll((v_scroll, 0));
                        f.render_widget(block, content_area);
                    }
                    2 => {
                        let rows: Vec<Row> = analysis
                            .correlations
                            .iter()
                            .map(|c| {
                                Row::new(vec![
                                    c.left.clone(),
                                    c.right.clone(),
                                    coefficient(c.coefficient),
                                    c.strength().to_string(),
                                    c.pairs.to_string(),
                                ])
                            })
                            .collect();
                        let header = Row::new(vec!["Left", "Right", "r", "Strength", "Pairs"])
                            .style(Style::default().fg(Color::Green));
                        let widths = [18u16, 18, 8, 10, 7].map(Constraint::Length);
                        let table = Table::new(rows, widths)
                            .header(header)
                            .block(thick_block("Correlations"))
                            .column_spacing(1)
                            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                            .style(Style::default().fg(Color::White));
                        f.render_stateful_widget(table, content_area, &mut corr_state);
                    }
                    3 => {
                        let block = Paragraph::new(chart_text.clone())
                            .block(thick_block("Charts"))
                            .wrap(Wrap { trim: false })
                            .scroll((v_scroll, 0));
                        f.render_widget(block, content_area);
                    }
                    _ => {
                        let block = Paragraph::new(narration)
                            .block(thick_block("Narration"))
                            .wrap(Wrap { trim: true })
                            .scroll((v_scroll, 0));
                        f.render_widget(block, content_area);
                    }
                }

                let footer_text = if status.is_empty() {
                    "'q' to exit | 'e' to export | Tab/Shift+Tab to switch tabs | Up/Down to scroll".to_string()
                } else {
                    status.clone()
                };
                let footer = Paragraph::new(footer_text)
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
                f.render_widget(footer, chunks[3]);
            })
            .map_err(terminal_error)?;

        if let Event::Key(key) = event::read().map_err(terminal_error)? {
            status.clear();
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char('e') => {
                    let export = Export {
                        analysis,
                        narration,
                        charts,
                    };
                    // The terminal is still in raw mode here, so failures go to the footer.
                    status = match export.write_to(Path::new(EXPORT_PATH)) {
                        Ok(()) => format!("Exported to {EXPORT_PATH}"),
                        Err(e) => format!("Export failed: {e}"),
                    };
                }
                KeyCode::Tab => {
                    tab_index = (tab_index + 1) % TAB_TITLES.len();
                    v_scroll = 0;
                }
                KeyCode::BackTab => {
                    tab_index = (tab_index + TAB_TITLES.len() - 1) % TAB_TITLES.len();
                    v_scroll = 0;
                }
                KeyCode::Up => match tab_index {
                    0 => step_selection(&mut column_state, column_rows.len(), false),
                    2 => step_selection(&mut corr_state, analysis.correlations.len(), false),
                    _ => v_scroll = v_scroll.saturating_sub(1),
                },
                KeyCode::Down => match tab_index {
                    0 => step_selection(&mut column_state, column_rows.len(), true),
                    2 => step_selection(&mut corr_state, analysis.correlations.len(), true),
                    _ => v_scroll = v_scroll.saturating_add(1),
                },
                _ => {}
            }
        }
    }

    disable_raw_mode().map_err(terminal_error)?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).map_err(terminal_error)?;
    terminal.show_cursor().map_err(terminal_error)?;

    Ok(())
}

fn step_selection(state: &mut TableState, len: usize, down: bool) {
    if len == 0 {
        return;
    }
    let next = match (state.selected(), down) {
        (Some(i), true) => (i + 1).min(len - 1),
        (Some(i), false) => i.saturating_sub(1),
        (None, true) => 0,
        (None, false) => len - 1,
    };
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::dataset::Dataset;

    fn analysis() -> AnalysisResult {
        let dataset = Dataset::from_strings(
            "t.csv",
            vec!["city".into(), "price".into()],
            vec![
                vec!["Oslo".into(), "10".into()],
                vec!["Oslo".into(), "".into()],
                vec!["Rome".into(), "30".into()],
            ],
        );
        AnalysisResult::build(&dataset, &InsightConfig::default()).unwrap()
    }

    #[test]
    fn test_column_cells() {
        let analysis = analysis();
        let cells = column_cells(&analysis.profiles["price"]);
        assert_eq!(cells[0], "price");
        assert_eq!(cells[1], "Numeric");
        assert_eq!(cells[2], "Currency");
        assert_eq!(cells[3], "20.00");
        assert_eq!(cells[8], "1");
        let city = column_cells(&analysis.profiles["city"]);
        assert_eq!(city[2], "Geography");
        assert_eq!(city[3], "N/A");
    }

    #[test]
    fn test_quality_lines_list_every_column() {
        let analysis = analysis();
        let text: Vec<String> = quality_lines(&analysis).iter().map(|l| l.to_string()).collect();
        assert_eq!(text[0], "Quality score: 83%");
        assert!(text.iter().any(|l| l == "price: complete 66.7%, unique 100.0%"));
    }

    #[test]
    fn test_export_reports_write_failure() {
        let analysis = analysis();
        let export = Export {
            analysis: &analysis,
            narration: "hello",
            charts: &[],
        };
        let dir = std::env::temp_dir().join(format!("mutter-tui-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("export.json");
        export.write_to(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["narration"], "hello");
        assert_eq!(written["analysis"]["rowCount"], 3);

        let missing_dir = dir.join("absent").join("export.json");
        assert!(matches!(export.write_to(&missing_dir), Err(MutterError::Io(_))));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_step_selection_clamps() {
        let mut state = TableState::default();
        step_selection(&mut state, 3, false);
        assert_eq!(state.selected(), Some(2));
        step_selection(&mut state, 3, true);
        assert_eq!(state.selected(), Some(2));
        step_selection(&mut state, 0, true);
        assert_eq!(state.selected(), Some(2));
    }
}
