//! Sitemap Harvester main entry point
//!
//! This is the command-line interface for the sitemap harvester.

use anyhow::Context;
use clap::Parser;
use sitemap_harvester::config::{load_config_with_hash, validate, Config};
use sitemap_harvester::crawler::{harvest, RunShape};
use sitemap_harvester::extract::ExtractMode;
use sitemap_harvester::output::print_report;
use sitemap_harvester::url::validate_root_url;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemap Harvester: collect email addresses or phone numbers from a site
///
/// Resolves the sitemap tree at SITEMAP_URL into page URLs, fetches every
/// page and writes each match to emails.txt or phones.txt.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvester")]
#[command(version)]
#[command(about = "Harvest emails or phone numbers from a site's sitemap", long_about = None)]
struct Cli {
    /// Root sitemap document (e.g. https://example.com/sitemap.xml)
    #[arg(value_name = "SITEMAP_URL")]
    sitemap_url: String,

    /// What to extract: -email or -phone
    #[arg(value_name = "MODE", allow_hyphen_values = true)]
    mode: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of workers (overrides the configuration)
    #[arg(short, long, conflicts_with = "sequential")]
    workers: Option<u32>,

    /// Run the fetch phase in a single loop without workers
    #[arg(long)]
    sequential: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Argument errors are reported before any work begins
    let mode = ExtractMode::from_flag(&cli.mode)?;
    let root = validate_root_url(&cli.sitemap_url)?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(workers) = cli.workers {
        config.harvest.workers = workers;
        validate(&config)?;
    }

    let shape = if cli.sequential {
        RunShape::Sequential
    } else {
        RunShape::Distributed {
            workers: config.harvest.workers as usize,
        }
    };

    let report = harvest(config, root.as_str(), mode, shape)
        .await
        .context("harvest failed")?;

    let printed = if cli.quiet {
        writeln!(std::io::stdout().lock(), "{}", report.elapsed_line())
    } else {
        print_report(&report)
    };
    if let Err(e) = printed {
        tracing::debug!("Could not print the run report: {}", e);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the echoed matches and the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvester=info,warn"),
            1 => EnvFilter::new("sitemap_harvester=debug,info"),
            2 => EnvFilter::new("sitemap_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
