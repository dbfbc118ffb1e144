//! Client for the paginated user listing endpoint.
//!
//! One call to [`RemoteUserClient::fetch_page`] issues `GET
//! {base}?results=N&page=P[&seed=S]`, retrying transport failures a fixed
//! number of times with a constant delay, and resolves to exactly one
//! [`Page`] or [`FetchError`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::{ListResponse, Page};
use crate::traits::{Headers, HttpClient, HttpError, Reachability, Sleeper};

/// Public randomuser.me endpoint.
pub const DEFAULT_BASE_URL: &str = "https://randomuser.me/api/";

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-call parameters for [`RemoteUserClient::fetch_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Number of users requested (`results` query parameter).
    pub page_size: u32,
    /// Seed pinning the ordering across pages; omitted from the query if `None`.
    pub seed: Option<String>,
    /// Additional attempts after a transport failure.
    pub retries: u32,
    /// Wait between attempts.
    pub retry_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            seed: None,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_seed(mut self, seed: Option<String>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Fetches pages of user records.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use userdeck::adapters::{ReqwestHttpClient, TokioSleeper};
/// use userdeck::api::{FetchOptions, RemoteUserClient};
/// use userdeck::reachability::NetworkReachabilityMonitor;
///
/// let client = RemoteUserClient::new(
///     Arc::new(ReqwestHttpClient::new()),
///     Arc::new(NetworkReachabilityMonitor::new()),
///     Arc::new(TokioSleeper),
/// );
/// let first = client.fetch_page(1, &FetchOptions::default()).await?;
/// let second = client
///     .fetch_page(2, &FetchOptions::default().with_seed(Some(first.seed.clone())))
///     .await?;
/// ```
pub struct RemoteUserClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
    reachability: Arc<dyn Reachability>,
    sleeper: Arc<dyn Sleeper>,
}

impl RemoteUserClient {
    /// Create a client against [`DEFAULT_BASE_URL`].
    pub fn new(
        http: Arc<dyn HttpClient>,
        reachability: Arc<dyn Reachability>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
            reachability,
            sleeper,
        }
    }

    /// Point the client at a different listing endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL for `page`.
    pub fn page_url(&self, page: u32, options: &FetchOptions) -> Result<String, FetchError> {
        let mut params = vec![
            ("results", options.page_size.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(seed) = &options.seed {
            params.push(("seed", seed.clone()));
        }
        reqwest::Url::parse_with_params(&self.base_url, &params)
            .map(|url| url.to_string())
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }

    /// Fetch one page.
    ///
    /// Connectivity is checked once, before the first attempt. Transport
    /// failures are retried up to `options.retries` times with the same URL;
    /// status, empty-body and decoding failures are returned immediately.
    pub async fn fetch_page(&self, page: u32, options: &FetchOptions) -> Result<Page, FetchError> {
        if page < 1 {
            return Err(FetchError::InvalidRequest("page must be >= 1".to_string()));
        }
        if options.page_size == 0 {
            return Err(FetchError::InvalidRequest("page size must be > 0".to_string()));
        }
        if !self.reachability.is_connected() {
            warn!("Skipping fetch of page {}: no connectivity", page);
            return Err(FetchError::NoConnectivity);
        }

        let url = self.page_url(page, options)?;
        info!("Fetching users from: {}", url);

        let mut retries_left = options.retries;
        let mut attempt = 1;
        let response = loop {
            match self.http.get(&url, &Headers::new()).await {
                Ok(response) => break response,
                Err(HttpError::InvalidUrl(msg)) => return Err(FetchError::InvalidUrl(msg)),
                Err(err) if retries_left > 0 => {
                    warn!(
                        "Fetch attempt {} for page {} failed: {}; retrying in {:?}",
                        attempt, page, err, options.retry_delay
                    );
                    retries_left -= 1;
                    attempt += 1;
                    self.sleeper.sleep(options.retry_delay).await;
                }
                Err(err) => {
                    warn!("Fetch of page {} failed after {} attempts: {}", page, attempt, err);
                    return Err(FetchError::NetworkFailure(err));
                }
            }
        };

        if !response.is_success() {
            return Err(FetchError::HttpError(response.status));
        }
        if response.is_empty() {
            return Err(FetchError::NoData);
        }

        let decoded: ListResponse = response.json()?;
        debug!(
            "Decoded {} users for page {} (seed {})",
            decoded.results.len(),
            decoded.info.page,
            decoded.info.seed
        );
        Ok(Page::from(decoded))
    }
}

impl std::fmt::Debug for RemoteUserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteUserClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
