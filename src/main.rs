// src/main.rs
mod config;
mod extractors;
mod roic;
mod scrape;
mod storage;
mod universe;
mod utils;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::Parser;

use config::{parse_mirror, ScrapeConfig};
use roic::models::{FinancialType, Period};
use roic::HttpPageDriver;
use scrape::{Orchestrator, RunOptions};
use universe::UniverseSource;
use utils::AppError;

/// Scrapes financial statement and ratio tables into per-ticker CSV files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file (every field optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated ticker symbols, replacing the configured universe
    #[arg(short, long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// File with one ticker per line, replacing the configured universe
    #[arg(long, conflicts_with = "tickers")]
    tickers_file: Option<PathBuf>,

    /// Reporting period
    #[arg(short, long, value_enum)]
    period: Option<Period>,

    /// Output directory for CSV files and manifests
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Category groups to scrape (comma-separated)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    groups: Vec<FinancialType>,

    /// Duplicate PRIMARY's output under MIRROR (repeatable)
    #[arg(long = "mirror", value_name = "PRIMARY=MIRROR", value_parser = parse_mirror)]
    mirrors: Vec<(String, String)>,

    /// Site base URL
    #[arg(long)]
    base_url: Option<String>,

    /// URL prefix of a rendering service returning the post-script DOM
    #[arg(long)]
    render_proxy: Option<String>,

    /// Re-fetch groups that have failed categories on record
    #[arg(long)]
    retry_failed: bool,

    /// Debug mode - verbose logs and page snapshots for failed tables
    #[arg(short, long)]
    debug: bool,
}

/// File configuration (or defaults) with CLI overrides applied.
fn build_config(args: &Args) -> Result<ScrapeConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => ScrapeConfig::default(),
    };

    if !args.tickers.is_empty() {
        config.universe = UniverseSource::Symbols { symbols: args.tickers.clone() };
    } else if let Some(path) = &args.tickers_file {
        config.universe = UniverseSource::File { path: path.clone() };
    }
    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if !args.groups.is_empty() {
        config.groups = args.groups.clone();
    }
    for (primary, mirror) in &args.mirrors {
        config.mirrors.insert(primary.clone(), mirror.clone());
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.render_proxy.is_some() {
        config.render_proxy = args.render_proxy.clone();
    }

    let mut seen = Vec::new();
    config.groups.retain(|group| {
        let first = !seen.contains(group);
        seen.push(*group);
        first
    });
    if config.groups.is_empty() {
        return Err(AppError::Config("no category groups selected".to_string()));
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Resolve configuration
    let config = build_config(&args)?;
    tracing::debug!("Effective configuration: {:?}", config);

    // 4. Resolve the ticker universe; nothing to do without it
    let tickers = universe::load_tickers(&config.universe, config.request_timeout()).await?;

    // 5. Wire the pipeline around one driver session
    let options = RunOptions { retry_failed: args.retry_failed, debug: args.debug };
    let orchestrator = Orchestrator::from_config(&config, options)?;
    let mut driver = HttpPageDriver::new(config.request_timeout(), config.render_proxy.clone())?;

    tracing::info!(
        "Scraping {} tickers, period {}, groups {:?} into {}",
        tickers.len(),
        config.period.as_str(),
        config.groups,
        config.output_dir.display()
    );
    let report = orchestrator.run(&mut driver, &tickers, config.period, &config.groups).await;

    // 6. Persist the run report
    match orchestrator.storage().save_report(&report) {
        Ok(path) => tracing::info!("Saved run report to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run report: {}", e),
    }

    let summary = report.summary;
    if summary.written == 0 && (summary.failed > 0 || summary.group_failures > 0) {
        return Err(AppError::Processing(format!(
            "No tables written; {} category failures, {} group failures",
            summary.failed, summary.group_failures
        )));
    }

    Ok(())
}
