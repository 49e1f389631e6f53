//! Configuration module for Grubmap
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Configuration is an explicit value handed to the crawler builder;
//! there is no process-wide singleton.
//!
//! # Example
//!
//! ```no_run
//! use grubmap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-exported so CLI overrides can be re-validated
pub use validation::validate;
