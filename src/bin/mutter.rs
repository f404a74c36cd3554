use clap::Parser;
use mutter::{Dataset, InsightConfig, InsightEngine, MutterError, render_tui};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mutter profiles tabular data and narrates what it finds.", long_about = None)]
struct Args {
    /// CSV file, or JSON (a stored dataset document or an array of records).
    #[arg(short = 'p', long = "path", required = true)]
    path: PathBuf,
    #[arg(short = 'q', long = "query", default_value = "summary")]
    query: String,
    /// Also print chart titles and image URLs.
    #[arg(long)]
    charts: bool,
    /// Print the full analysis as JSON instead of narration.
    #[arg(long)]
    json: bool,
    #[arg(long)]
    tui: bool,
    /// JSON file overriding keyword tables and limits.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dataset(path: &Path) -> Result<Dataset, MutterError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Dataset::from_json_file(path)
    } else {
        Dataset::from_csv(path)
    }
}

fn main() -> Result<(), MutterError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => InsightConfig::from_json_file(path)?,
        None => InsightConfig::default(),
    };
    let engine = InsightEngine::new(config);
    let dataset = load_dataset(&args.path)?;
    info!(
        file = dataset.file_name(),
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "loaded dataset"
    );

    if args.json {
        let analysis = engine.profile(&dataset)?;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let narration = engine.analyze(&args.query, &dataset);
    let charts = if args.charts || args.tui {
        engine.select_charts(&dataset)
    } else {
        Vec::new()
    };

    if args.tui {
        let analysis = engine.profile(&dataset)?;
        return render_tui(&analysis, &narration, &charts, &engine.config().charts);
    }

    println!("{narration}");
    let limits = &engine.config().charts;
    for chart in &charts {
        println!();
        println!("{}", chart.title);
        println!("{}", chart.description);
        println!("{}", chart.chart_url(&limits.base_url, limits.width, limits.height));
    }
    Ok(())
}
