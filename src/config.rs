//! Application configuration.
//!
//! Defaults suit the public randomuser.me endpoint. [`AppConfig::from_env`]
//! layers `USERDECK_*` environment overrides on top.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::api::{FetchOptions, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY};
use crate::image_cache::{ImageCacheConfig, DEFAULT_COST_LIMIT, DEFAULT_COUNT_LIMIT};

pub const ENV_API_URL: &str = "USERDECK_API_URL";
pub const ENV_PAGE_SIZE: &str = "USERDECK_PAGE_SIZE";
pub const ENV_RETRIES: &str = "USERDECK_RETRIES";
pub const ENV_DATA_DIR: &str = "USERDECK_DATA_DIR";

/// Configuration for building [`crate::services::Services`].
///
/// # Example
///
/// ```ignore
/// use userdeck::config::AppConfig;
///
/// let config = AppConfig::default()
///     .with_page_size(50)
///     .with_data_dir("/tmp/userdeck");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listing endpoint
    pub api_base_url: String,
    /// Users per page (default: 25)
    pub page_size: u32,
    /// Retries after a transport failure (default: 2)
    pub retries: u32,
    /// Wait between retries (default: 1s)
    pub retry_delay: Duration,
    /// Per-request timeout for the HTTP client (default: 30s)
    pub request_timeout: Duration,
    /// Directory holding persisted bookmarks and the pagination seed
    pub data_dir: PathBuf,
    /// Max cached images (default: 100)
    pub image_cache_count_limit: usize,
    /// Max decoded bytes of cached images (default: 100 MiB)
    pub image_cache_cost_limit: usize,
    /// Reachability probe period; `None` disables the probe
    pub probe_interval: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: Duration::from_secs(30),
            data_dir: default_data_dir(),
            image_cache_count_limit: DEFAULT_COUNT_LIMIT,
            image_cache_cost_limit: DEFAULT_COST_LIMIT,
            probe_interval: None,
        }
    }
}

/// `<platform data dir>/userdeck`, or `.userdeck` in the working directory
/// when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("userdeck"))
        .unwrap_or_else(|| PathBuf::from(".userdeck"))
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_image_cache_limits(mut self, count: usize, cost: usize) -> Self {
        self.image_cache_count_limit = count;
        self.image_cache_cost_limit = cost;
        self
    }

    pub fn with_probe_interval(mut self, interval: Option<Duration>) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Defaults overridden by `USERDECK_API_URL`, `USERDECK_PAGE_SIZE`,
    /// `USERDECK_RETRIES` and `USERDECK_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`AppConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            config.api_base_url = url;
        }
        if let Some(page_size) = parse_var(&lookup, ENV_PAGE_SIZE) {
            if page_size == 0 {
                warn!("Ignoring {}=0; page size must be positive", ENV_PAGE_SIZE);
            } else {
                config.page_size = page_size;
            }
        }
        if let Some(retries) = parse_var(&lookup, ENV_RETRIES) {
            config.retries = retries;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }

    /// Per-call options for the fetch client.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default()
            .with_page_size(self.page_size)
            .with_retries(self.retries)
            .with_retry_delay(self.retry_delay)
    }

    pub fn image_cache_config(&self) -> ImageCacheConfig {
        ImageCacheConfig::default()
            .with_count_limit(self.image_cache_count_limit)
            .with_cost_limit(self.image_cache_cost_limit)
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u32> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid {}={:?}: {}", key, raw, e);
            None
        }
    }
}
