//! Storelens CLI binary.
//!
//! Loads the daily records and store metadata once and prints one analysis.

mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use storelens::events::{EventKind, ImpactMetric, ImpactRecord};
use storelens::metrics::{CohortMetric, Frequency};
use storelens::output::{ExportFormat, Exporter, ReportBuilder};
use storelens::{AnalysisConfig, Dataset};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storelens")]
#[command(about = "Storelens: store sales, customers and event impact analysis", long_about = None)]
#[command(version)]
struct Cli {
    /// Daily records CSV
    #[arg(long, global = true, default_value = "train.csv")]
    daily: PathBuf,

    /// Store metadata CSV
    #[arg(long, global = true, default_value = "store.csv")]
    stores: PathBuf,

    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key figures and cohort ranks of one store
    Profile {
        /// Store id
        store: i64,

        /// Output format (text, markdown, csv, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Also write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Rank a store among all stores
    Rank {
        /// Store id
        store: i64,

        /// Single metric to rank on (all metrics if omitted)
        #[arg(long)]
        metric: Option<String>,

        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare stores before and after a competitor opened or promo2 started
    Impact {
        /// Event kind (competition or promo2)
        kind: String,

        /// Drop stores with fewer days before or after the event
        #[arg(long)]
        min_days: Option<usize>,

        /// Field to order by
        #[arg(long, default_value = "spc_diff")]
        sort: String,

        /// Smallest values first
        #[arg(long)]
        ascending: bool,

        /// Show only the first N stores
        #[arg(long)]
        top: Option<usize>,

        /// Output format (text, csv, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the export to this file instead of stdout; the format's
        /// extension is added when the name has none
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Means and totals per group of rows
    Summary {
        /// Grouping columns, comma separated
        #[arg(long, value_delimiter = ',', default_value = "store_type")]
        by: Vec<String>,

        /// Only count days the stores were open
        #[arg(long)]
        open_only: bool,
    },

    /// Chain-wide sales and customers per period
    Timeline {
        /// Period length (weekly or monthly)
        #[arg(long, default_value = "weekly")]
        freq: String,
    },

    /// Weekly series of one store with event state and moving averages
    Weekly {
        /// Store id
        store: i64,
    },

    /// Competition and promo2 events of one store
    Events {
        /// Store id
        store: i64,
    },
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storelens=info"));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Commands::Impact {
        min_days: Some(days),
        ..
    } = &cli.command
    {
        config.impact.min_days = Some(*days);
    }

    let dataset = Dataset::load(&cli.daily, &cli.stores, config)?;

    match cli.command {
        Commands::Profile {
            store,
            format,
            report,
        } => {
            show_profile(&dataset, store, &format, report.as_deref())?;
        }
        Commands::Rank {
            store,
            metric,
            format,
        } => {
            show_ranks(&dataset, store, metric.as_deref(), &format)?;
        }
        Commands::Impact {
            kind,
            sort,
            ascending,
            top,
            format,
            output,
            ..
        } => {
            let view = ImpactView {
                sort: sort.parse()?,
                ascending,
                top,
            };
            show_impact(&dataset, kind.parse()?, &view, &format, output.as_deref())?;
        }
        Commands::Summary { by, open_only } => {
            let by: Vec<&str> = by.iter().map(String::as_str).collect();
            let summary = dataset.summary(&by, open_only)?;

            render::heading(&format!("Summary by {}", by.join(", ")));
            if open_only {
                println!("Open days only\n");
            }
            println!("{summary}");
        }
        Commands::Timeline { freq } => {
            let frequency: Frequency = freq.parse()?;
            render::heading(&format!("Chain {frequency} timeline"));
            println!("{}", dataset.timeline(frequency)?);
        }
        Commands::Weekly { store } => {
            render::heading(&format!("Store {store} weekly series"));
            println!("{}", dataset.weekly(store)?);
        }
        Commands::Events { store } => {
            render::heading(&format!("Store {store} events"));
            for kind in EventKind::ALL {
                render::print_event(kind, dataset.event_window(store, kind)?.as_ref());
            }
        }
    }

    Ok(())
}

fn show_profile(
    dataset: &Dataset,
    store: i64,
    format: &str,
    report: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = dataset.profile(store)?;

    match format {
        "text" => print!("{}", profile.to_ascii_table()),
        "markdown" | "md" => print!("{}", profile.to_markdown()),
        other => println!(
            "{}",
            profile.export_to_string(other.parse::<ExportFormat>()?)?
        ),
    }

    if let Some(path) = report {
        ReportBuilder::new()
            .subject(format!("store {store}"))
            .contents_from(&profile)?
            .build()?
            .write_to_file(path)?;
        tracing::info!(path = %path.display(), "wrote profile report");
    }

    Ok(())
}

fn show_ranks(
    dataset: &Dataset,
    store: i64,
    metric: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ranks = match metric {
        Some(name) => vec![dataset.rank(store, name.parse::<CohortMetric>()?)?],
        None => dataset.rank_all(store)?,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&ranks)?);
    } else {
        render::print_ranks(store, &ranks);
    }

    Ok(())
}

struct ImpactView {
    sort: ImpactMetric,
    ascending: bool,
    top: Option<usize>,
}

fn show_impact(
    dataset: &Dataset,
    kind: EventKind,
    view: &ImpactView,
    format: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = dataset.impact(kind)?;
    let mut records = table.sorted_by(view.sort, !view.ascending);
    if let Some(n) = view.top {
        records.truncate(n);
    }

    if format == "text" {
        render::print_impact(kind, view.sort, table.len(), &records);
        return Ok(());
    }

    let format: ExportFormat = format.parse()?;
    let rows: Vec<ImpactRecord> = records.into_iter().cloned().collect();
    match output {
        Some(path) => {
            let path = format.file_path(path);
            rows.export_to_file(&path, format)?;
            tracing::info!(path = %path.display(), stores = rows.len(), "wrote impact table");
        }
        None => println!("{}", rows.export_to_string(format)?),
    }

    Ok(())
}
