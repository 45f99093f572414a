//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl breadth-first crawler.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{apply_env_overrides, load_config_with_hash, validate, Config};
use ripple_crawl::crawler::crawl;
use ripple_crawl::output::{generate_markdown_summary, print_report};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a bounded breadth-first web crawler
///
/// Ripple-Crawl walks outward from its seed URLs, records the title and a text snippet of every
/// page it visits, and stops after a fixed number of distinct pages or when it runs out of
/// links.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A bounded breadth-first web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL to start from; repeat to give several (replaces configured seeds)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Stop after this many distinct pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum number of fetches in flight (1 = single-flight)
    #[arg(long)]
    fetch_concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    let config = build_config(&cli)?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let report = crawl(config.clone()).await.context("crawl failed")?;
    print_report(&report);

    if let Some(summary_path) = &config.output.summary_path {
        generate_markdown_summary(&report, Path::new(summary_path))
            .with_context(|| format!("failed to write summary to {}", summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), then layers environment and command-line overrides on top
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config);

    if !cli.seeds.is_empty() {
        config.crawler.seeds = cli.seeds.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(fetch_concurrency) = cli.fetch_concurrency {
        config.crawler.fetch_concurrency = fetch_concurrency;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Ripple-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Fetch concurrency: {}", config.crawler.fetch_concurrency);
    println!("  Parse workers: {}", config.crawler.parse_workers);
    println!("  Stats interval: {}s", config.crawler.stats_interval_secs);
    println!("  Snippet cap: {} characters", config.crawler.snippet_cap);
    match config.crawler.fetch_timeout_secs {
        Some(secs) => println!("  Fetch timeout: {}s", secs),
        None => println!("  Fetch timeout: none"),
    }

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nSink:");
    match &config.sink.database_path {
        Some(path) => println!("  Database: {} (required: {})", path, config.sink.required),
        None => println!("  Disabled"),
    }

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
