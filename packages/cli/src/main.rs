#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the accident dashboard.
//!
//! Loads and cleans the configured dataset, then either prints the filter
//! choices (`options`), prints every chart for one selection (`summary`),
//! or serves the HTTP API (`serve`).
//!
//! Uses `indicatif-log-bridge` (via [`accident_dash_cli_utils::init_logger`])
//! so that log lines and the load progress bar never fight for the
//! terminal.

mod report;

use std::path::PathBuf;

use accident_dash_accident_models::WeatherMetric;
use accident_dash_analytics::dashboard::build_view;
use accident_dash_analytics::options::{filter_options, resolve_filter};
use accident_dash_cli_utils::{IndicatifProgress, MultiProgress};
use accident_dash_dataset::config::AppConfig;
use accident_dash_dataset::{CleanedDataset, load_dataset};
use accident_dash_server_models::FilterQueryParams;
use accident_dash_source::registry::all_sources;
use accident_dash_source::{DEFAULT_ROW_LIMIT, LoadOptions};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "accident_dash", about = "US accident dashboard data engine")]
struct Cli {
    /// Config file (default: `$ACCIDENT_DASH_CONFIG`, then `./accident_dash.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Read the dataset from this CSV file instead of the configured source
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    /// Maximum number of rows to load
    #[arg(long, global = true, conflicts_with = "no_limit")]
    limit: Option<u64>,
    /// Load every row
    #[arg(long, global = true)]
    no_limit: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in data sources
    Sources,
    /// Print the filter choices and defaults for the dataset
    Options {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print every chart for one filter selection
    Summary(SummaryArgs),
    /// Start the HTTP API server
    Serve,
}

#[derive(Args)]
struct SummaryArgs {
    /// Region code (default: CA, or the first region in the data)
    #[arg(long)]
    region: Option<String>,
    /// Comma-separated severity levels, e.g. "2,3" (default: all)
    #[arg(long)]
    severities: Option<String>,
    /// First year included (default: earliest in the data)
    #[arg(long)]
    year_from: Option<i32>,
    /// Last year included (default: latest in the data)
    #[arg(long)]
    year_to: Option<i32>,
    /// Weather metric: visibility, temperature or `wind_speed`
    #[arg(long)]
    metric: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl SummaryArgs {
    fn query(&self) -> FilterQueryParams {
        FilterQueryParams {
            region: self.region.clone(),
            severities: self.severities.clone(),
            year_from: self.year_from,
            year_to: self.year_to,
            metric: self.metric.clone(),
        }
    }
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            row_limit: if self.no_limit {
                None
            } else {
                Some(self.limit.unwrap_or(DEFAULT_ROW_LIMIT))
            },
        }
    }

    fn app_config(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = AppConfig::discover(self.config.as_deref())?;
        if let Some(path) = &self.source {
            config.source = config.source.with_local_file(path.clone());
        }
        Ok(config)
    }
}

async fn load(
    multi: &MultiProgress,
    config: &AppConfig,
    options: &LoadOptions,
) -> Result<CleanedDataset, Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::rows_bar(multi, &format!("Loading {}", config.source.name));
    Ok(load_dataset(&config.source, options, progress).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = accident_dash_cli_utils::init_logger();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Sources => {
            println!("{:<20} {:<12} NAME", "ID", "VERSION");
            println!("{}", "-".repeat(60));
            for source in all_sources() {
                println!("{:<20} {:<12} {}", source.id, source.version, source.name);
            }
        }
        Commands::Options { json } => {
            let config = cli.app_config()?;
            let dataset = load(&multi, &config, &cli.load_options()).await?;
            let options = filter_options(&dataset.table, &config.dashboard.default_region);
            if *json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                report::print_options(&dataset, &options);
            }
        }
        Commands::Summary(args) => {
            let config = cli.app_config()?;
            let query = args.query();
            let selection = query.selection()?;
            let metric = query.metric()?;

            let dataset = load(&multi, &config, &cli.load_options()).await?;
            let options = filter_options(&dataset.table, &config.dashboard.default_region);
            let filter = resolve_filter(&options, &selection)?;
            let metric = metric
                .or_else(|| options.metrics.first().copied())
                .unwrap_or(WeatherMetric::Visibility);

            let view = build_view(&dataset.table, &filter, metric, &config.dashboard)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                report::print_view(&view);
            }
        }
        Commands::Serve => {
            let config = cli.app_config()?;
            let options = cli.load_options();
            // The server uses actix-web's runtime, so run it in a blocking
            // task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new()
                    .block_on(accident_dash_server::run_server(config, options))
            })
            .await??;
        }
    }

    Ok(())
}
