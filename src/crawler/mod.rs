//! Crawler module for listing and detail extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a swappable collaborator trait
//! - Listing-card and menu extraction from parsed HTML
//! - Two-level fan-out coordination with single-writer aggregation

mod coordinator;
mod fetcher;
mod listing;
mod menu;

pub use coordinator::{Crawler, CrawlerBuilder, StreamOutputs};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use listing::{extract_cards, ListingOutcome};
pub use menu::{extract_menu, MenuOutcome};

use crate::config::Config;
use crate::model::CrawlResult;
use crate::ConfigError;
use scraper::{ElementRef, Selector};

/// Runs a complete crawl in collect mode
///
/// This is the main entry point for a one-shot crawl: it builds a crawler
/// from the configuration, runs it to completion, and returns the
/// accumulated restaurants and errors.
///
/// # Example
///
/// ```no_run
/// use grubmap::config::load_config;
/// use grubmap::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let result = crawl(config).await?;
/// println!("{} restaurants", result.restaurants.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlResult, ConfigError> {
    let crawler = CrawlerBuilder::new(config).build()?;
    Ok(crawler.run().await)
}

/// First element matching `css` within `scope`
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Text content of the first element matching `css` within `scope`
pub(crate) fn select_text(scope: ElementRef, css: &str) -> Option<String> {
    select_first(scope, css).map(|element| element.text().collect::<String>())
}

/// Attribute value of the first element matching `css` within `scope`
pub(crate) fn select_attr(scope: ElementRef, css: &str, attr: &str) -> Option<String> {
    select_first(scope, css)?
        .value()
        .attr(attr)
        .map(str::to_string)
}
