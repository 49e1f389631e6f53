use serde::Deserialize;

/// Main configuration structure for Grubmap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the delivery site (no trailing slash)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// City slug used in the listing path
    pub city: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of listing pages to crawl (pages 0..max-pages)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Cap on simultaneous network fetches; 0 disables the cap
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// User agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("grubmap/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// The fixed listing URL for this run: `{base}/{city}/delivery`
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}/delivery",
            self.site.base_url.trim_end_matches('/'),
            self.site.city
        )
    }
}
