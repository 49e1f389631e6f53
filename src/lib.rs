//! Grubmap: a concurrent food-delivery menu crawler
//!
//! This crate crawls a paginated restaurant listing, fetches every listed
//! restaurant's detail page, and extracts a structured menu (categories,
//! items, servings, prices). Results and errors fan back into an in-memory
//! collection or caller-supplied channels.

pub mod config;
pub mod crawler;
pub mod duration;
pub mod model;

use thiserror::Error;

/// Which extraction stage produced a [`CrawlError`]
///
/// The stage matters for diagnostics: a burst of `ListingFetch` errors means
/// the site is down or the pagination URL changed, while `PriceParse` errors
/// point at a markup change on detail pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ListingFetch,
    RatingParse,
    DurationParse,
    DetailFetch,
    PriceParse,
}

/// An error produced by one unit of crawl work, tagged with its stage
///
/// Every variant carries enough context to identify the failing item: the
/// listing page number or the restaurant's detail path. None of these abort
/// the run; they are collected alongside the results.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to fetch listing page {page}: {source}")]
    ListingFetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("invalid star rating {value:?} on card {url}: {source}")]
    RatingParse {
        url: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid delivery estimate {value:?} on card {url}: {source}")]
    DurationParse {
        url: String,
        value: String,
        #[source]
        source: duration::DurationError,
    },

    #[error("failed to fetch detail page {url}: {source}")]
    DetailFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid price {value:?} on {url}: {source}")]
    PriceParse {
        url: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

impl CrawlError {
    /// The extraction stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            CrawlError::ListingFetch { .. } => Stage::ListingFetch,
            CrawlError::RatingParse { .. } => Stage::RatingParse,
            CrawlError::DurationParse { .. } => Stage::DurationParse,
            CrawlError::DetailFetch { .. } => Stage::DetailFetch,
            CrawlError::PriceParse { .. } => Stage::PriceParse,
        }
    }
}

/// Errors from the document fetch collaborator
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("crawl cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("stream mode requires item, error, and done channels")]
    MissingStreamOutputs,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Crawler, CrawlerBuilder, Fetcher, HttpFetcher, StreamOutputs};
pub use model::{CrawlResult, Meal, Restaurant, Serving};
