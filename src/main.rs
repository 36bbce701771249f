//! Arachne main entry point
//!
//! This is the command-line interface for the Arachne scraping engine.

use anyhow::Context;
use arachne::config::{load_config_with_hash, Config};
use arachne::metrics::print_metrics;
use arachne::output::{print_summary, render_report, write_report, ScrapeReport};
use arachne::Orchestrator;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Arachne: a concurrent web scraper
///
/// Arachne fetches a batch of URLs concurrently, or follows next-page links
/// from a seed URL, while limiting concurrency per domain, backing off from
/// failing domains and retrying transient errors.
#[derive(Parser, Debug)]
#[command(name = "arachne")]
#[command(version)]
#[command(about = "A concurrent web scraper", long_about = None)]
struct Cli {
    /// URLs to scrape concurrently
    #[arg(value_name = "URLS", required_unless_present = "site")]
    urls: Vec<String>,

    /// Path to TOML configuration file (defaults plus SCRAPER_* variables otherwise)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Follow next-page links from this seed URL instead of scraping a batch
    #[arg(long, value_name = "SEED", conflicts_with = "urls")]
    site: Option<String>,

    /// Write the JSON report here instead of the configured output file
    #[arg(short, long, value_name = "PATH", conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the JSON report to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_hash) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    setup_logging(&config.output.log_level, cli.verbose, cli.quiet);
    if let Some(hash) = config_hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    match run(&cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Loads the configuration file, or falls back to defaults plus environment
fn load(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok((config, Some(hash)))
        }
        None => {
            let config = Config::from_env().context("invalid environment configuration")?;
            Ok((config, None))
        }
    }
}

/// Sets up the logging/tracing subscriber based on config and verbosity
fn setup_logging(level: &str, verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new(format!("arachne={},warn", level)),
            1 => EnvFilter::new("arachne=debug,info"),
            2 => EnvFilter::new("arachne=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the requested mode and reports; returns whether every URL succeeded
async fn run(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let orchestrator = Orchestrator::new(config).context("failed to build HTTP client")?;

    let results = match &cli.site {
        Some(seed) => orchestrator.scrape_site(seed).await,
        None => orchestrator.scrape_urls(cli.urls.clone()).await,
    };

    let report = ScrapeReport::collect(results, &orchestrator, config.output.enable_metrics);
    let all_succeeded = report.failures() == 0;

    if cli.stdout {
        println!("{}", render_report(&report)?);
        return Ok(all_succeeded);
    }

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.output_file));
    write_report(&path, &report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;

    if !cli.quiet {
        print_summary(&report.results);
        if let Some(metrics) = &report.metrics {
            println!();
            print_metrics(metrics);
        }
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(all_succeeded)
}
