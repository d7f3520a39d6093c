//! Configuration for the keiba-scrape CLI.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::scraper::parsers::RowPolicy;
use crate::scraper::ScrapeOptions;

/// HTTP and assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Horse pages fetched at once; 1 is strictly sequential
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Drop malformed result rows instead of failing the horse
    #[serde(default = "default_skip_malformed_rows")]
    pub skip_malformed_rows: bool,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_fetches() -> usize {
    1
}

fn default_skip_malformed_rows() -> bool {
    true
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            skip_malformed_rows: default_skip_malformed_rows(),
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn options(&self) -> ScrapeOptions {
        ScrapeOptions {
            max_concurrent_fetches: self.max_concurrent_fetches.max(1),
            row_policy: if self.skip_malformed_rows {
                RowPolicy::Skip
            } else {
                RowPolicy::Abort
            },
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
}

impl AppConfig {
    /// Load configuration, reading `path` instead of `keiba-scrape.*` when given
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("keiba-scrape").required(false),
        };

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file)
            // Override with environment variables (KEIBA__SCRAPER__TIMEOUT_SECS, etc.)
            .add_source(
                config::Environment::with_prefix("KEIBA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
