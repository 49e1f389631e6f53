use crate::config::types::{Config, CrawlerConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::Validation(format!("base-url '{}' is not a valid URL: {}", config.base_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.city.is_empty() {
        return Err(ConfigError::Validation("city cannot be empty".to_string()));
    }

    // The city is interpolated into a URL path segment
    if !config
        .city
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "city must contain only alphanumeric characters and hyphens, got '{}'",
            config.city
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be at most 10000, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_fetches > 1_000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be at most 1000, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
