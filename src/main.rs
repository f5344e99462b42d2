//! Rental-Crawler main entry point
//!
//! This is the command-line interface for the rental listing crawler.

use anyhow::Context;
use clap::Parser;
use rental_crawler::config::{load_config_with_hash, Config};
use rental_crawler::crawler::crawl;
use rental_crawler::url::index_url;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rental-Crawler: a classifieds rental listing harvester
///
/// Walks the search result pages of every configured region, extracts each
/// listing's rental attributes and appends the collected records to the
/// properties file when the crawl finishes.
#[derive(Parser, Debug)]
#[command(name = "rental-crawler")]
#[command(version)]
#[command(about = "A classifieds rental listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rental_crawler=info,warn"),
            1 => EnvFilter::new("rental_crawler=debug,info"),
            2 => EnvFilter::new("rental_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the regions and start pages
fn handle_dry_run(config: &Config) {
    println!("=== Rental-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Testing mode: {}", config.crawler.testing_mode);
    println!(
        "  Request delay: {}s (auto-throttle: {})",
        config.crawler.request_delay_seconds, config.crawler.auto_throttle
    );
    if config.crawler.allowed_domains.is_empty() {
        println!("  Allowed domains: any");
    } else {
        println!(
            "  Allowed domains: {}",
            config.crawler.allowed_domains.join(", ")
        );
    }

    println!("\nOutput:");
    println!("  Properties: {}", config.output.properties_path);
    match &config.notify {
        Some(notify) => println!("  Notify: {}", notify.email),
        None => println!("  Notify: disabled"),
    }

    println!("\nRegions ({}):", config.start_urls.len());
    for (region, base_url) in &config.start_urls {
        println!(
            "  - {}: {}",
            region,
            index_url(base_url, &config.crawler.search_path)
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Regions: {}, search path: {}",
        config.start_urls.len(),
        config.crawler.search_path
    );

    let report = crawl(config).await.context("Crawl failed")?;
    tracing::info!(
        "Crawl completed: {} listings collected",
        report.unique_listings
    );

    Ok(())
}
