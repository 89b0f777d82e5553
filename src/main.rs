use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use kpiboard::{
    config::DashboardConfig,
    dashboard::{Dashboard, Selection},
    encode::{read_series_file, write_series_file},
    kpi::Catalogue,
    mock::MockGenerator,
    render::render_html,
    DateInterval, MetricSeries, Timeline,
};
use log::info;
use std::{fs, io::Write, path::PathBuf};
use tracing_subscriber::EnvFilter;

/// Render the KPI dashboard as a self-contained HTML page.
#[derive(Parser, Debug)]
#[command(name = "kpiboard", version, about)]
struct Args {
    /// JSON dashboard config; defaults apply to any missing field.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV series (date,metric,...). Mock data is generated when absent.
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Days of mock data to generate, ending at the anchor date.
    #[arg(long, default_value_t = 365)]
    days: u32,

    /// Last day of the timeline window (YYYY-MM-DD). Defaults to the last
    /// date in the series, or today.
    #[arg(long)]
    anchor: Option<NaiveDate>,

    /// "Last 7 days", "Last 30 days", "Quarter" or "Year" (also 7d, 30d).
    #[arg(long, default_value = "Last 7 days")]
    timeline: Timeline,

    #[arg(long, default_value = "")]
    search: String,

    /// Restrict project blocks to these projects. Repeatable.
    #[arg(long = "project")]
    projects: Vec<String>,

    /// Output HTML file. Writes to stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write the series used for the dashboard to this CSV file.
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    let today = Local::now().date_naive();
    let series = load_series(&args, today)?;
    if let Some(path) = &args.export_csv {
        write_series_file(path, &series)
            .with_context(|| format!("writing series to {}", path.display()))?;
        info!("wrote {} rows to {}", series.len(), path.display());
    }

    let anchor = resolve_anchor(args.anchor, &series, today);
    let selection = Selection {
        search: args.search.clone(),
        timeline: args.timeline,
        projects: args.projects.clone(),
        anchor,
    };

    let dashboard = Dashboard::build(&config, &Catalogue::default(), &series, &selection)
        .context("building dashboard")?;
    let html = render_html(&dashboard);

    match &args.out {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
            info!("dashboard written to {}", path.display());
        }
        None => std::io::stdout()
            .write_all(html.as_bytes())
            .context("writing dashboard to stdout")?,
    }
    Ok(())
}

fn load_series(args: &Args, today: NaiveDate) -> Result<MetricSeries> {
    match &args.data {
        Some(path) => {
            let series = read_series_file(path)
                .with_context(|| format!("reading series {}", path.display()))?;
            info!("loaded {} rows from {}", series.len(), path.display());
            Ok(series)
        }
        None => {
            info!("generating {} days of mock data (seed {})", args.days, args.seed);
            mock_series(args.seed, args.days, args.anchor.unwrap_or(today))
        }
    }
}

/// Mock rows for the `days` dates ending on `end`.
fn mock_series(seed: u64, days: u32, end: NaiveDate) -> Result<MetricSeries> {
    let window = DateInterval::ending(end, i64::from(days))
        .with_context(|| format!("cannot generate {} days of mock data", days))?;
    MockGenerator::new(seed)
        .generate(window.start, days)
        .with_context(|| format!("cannot generate {} days of mock data", days))
}

/// `--anchor` if given, else the last date in the series, else today.
fn resolve_anchor(
    explicit: Option<NaiveDate>,
    series: &MetricSeries,
    today: NaiveDate,
) -> NaiveDate {
    explicit.or_else(|| series.last_date()).unwrap_or(today)
}
