//! Grubmap main entry point
//!
//! Command-line interface for crawling a food-delivery listing into
//! structured restaurant menus.

use clap::Parser;
use grubmap::config::{load_config_with_hash, validate, Config};
use grubmap::crawler::CrawlerBuilder;
use grubmap::model::Restaurant;
use grubmap::CrawlError;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tracing_subscriber::EnvFilter;

/// Grubmap: a concurrent food-delivery menu crawler
///
/// Crawls a paginated restaurant listing, fetches every restaurant's detail
/// page, and emits structured menus as JSON.
#[derive(Parser, Debug)]
#[command(name = "grubmap")]
#[command(version)]
#[command(about = "A concurrent food-delivery menu crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the configured city
    #[arg(long)]
    city: Option<String>,

    /// Override the configured base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the configured number of listing pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Emit restaurants as newline-delimited JSON while the crawl runs
    #[arg(long)]
    stream: bool,

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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::debug!("Configuration hash: {}", config_hash);

    if let Some(city) = cli.city {
        config.site.city = city;
    }
    if let Some(base_url) = cli.base_url {
        config.site.base_url = base_url;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    // Overrides bypass the loader, so validate again
    validate(&config)?;

    tracing::info!(
        "Crawling {} pages of {}",
        config.crawler.max_pages,
        config.listing_url()
    );

    if cli.stream {
        run_streaming(config).await
    } else {
        run_collected(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("grubmap=info,warn"),
            1 => EnvFilter::new("grubmap=debug,info"),
            2 => EnvFilter::new("grubmap=trace,debug"),
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

/// Collect mode: run to completion, then print the restaurants as JSON
async fn run_collected(config: Config) -> anyhow::Result<()> {
    let crawler = CrawlerBuilder::new(config).build()?;
    let result = crawler.run().await;

    for error in &result.errors {
        tracing::warn!("{}", error);
    }
    tracing::info!(
        "Crawled {} restaurants with {} errors",
        result.restaurants.len(),
        result.errors.len()
    );

    serde_json::to_writer_pretty(std::io::stdout().lock(), &result.restaurants)?;
    println!();
    Ok(())
}

/// Stream mode: print each restaurant as a JSON line as it completes
async fn run_streaming(config: Config) -> anyhow::Result<()> {
    let (item_tx, mut item_rx) = mpsc::unbounded_channel::<Restaurant>();
    let (error_tx, mut error_rx) = mpsc::unbounded_channel::<CrawlError>();
    let (done_tx, done_rx) = oneshot::channel();

    let crawler = CrawlerBuilder::new(config)
        .stream()
        .item_channel(item_tx)
        .error_channel(error_tx)
        .done_channel(done_tx)
        .build()?;

    let run = tokio::spawn(crawler.run());

    let printer = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(restaurant) = item_rx.recv().await {
            match serde_json::to_string(&restaurant) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("Failed to serialize restaurant: {}", e),
            }
            count += 1;
        }
        count
    });

    let errors = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(error) = error_rx.recv().await {
            tracing::warn!("{}", error);
            count += 1;
        }
        count
    });

    // All data strictly precedes the completion signal
    let _ = done_rx.await;
    run.await?;

    let crawled = printer.await?;
    let failed = errors.await?;
    tracing::info!("Crawled {} restaurants with {} errors", crawled, failed);
    Ok(())
}
