//! Errors surfaced by the user listing client.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Terminal outcome of a failed `fetch_page` call.
///
/// Only [`FetchError::NetworkFailure`] is produced after internal retries;
/// every other variant is returned on the first attempt that hits it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The reachability monitor reported no connectivity; no request was made.
    #[error("No internet connection")]
    NoConnectivity,

    /// The transport kept failing after all retries.
    #[error("Network error: {0}")]
    NetworkFailure(HttpError),

    /// The server answered with a status outside 200-299.
    #[error("HTTP error with status code: {0}")]
    HttpError(u16),

    /// The server answered 2xx with an empty body.
    #[error("No data received")]
    NoData,

    /// The body did not match the expected response schema.
    #[error("Failed to decode data: {0}")]
    DecodingFailure(String),

    /// The request URL could not be built or was rejected by the transport.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Arguments violated the call's preconditions.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Check if retrying the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::NoConnectivity | FetchError::NetworkFailure(_) => ErrorCategory::Network,
            FetchError::HttpError(status) if *status >= 500 || *status == 429 || *status == 408 => {
                ErrorCategory::Server
            }
            FetchError::HttpError(_) => ErrorCategory::Client,
            FetchError::NoData | FetchError::DecodingFailure(_) => ErrorCategory::Server,
            FetchError::InvalidUrl(_) => ErrorCategory::Configuration,
            FetchError::InvalidRequest(_) => ErrorCategory::Client,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NoConnectivity => {
                "You appear to be offline. Please check your internet connection.".to_string()
            }
            FetchError::NetworkFailure(_) => {
                "Unable to reach the server. Please try again.".to_string()
            }
            FetchError::HttpError(status) => match *status {
                404 => "The requested resource was not found.".to_string(),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => {
                    "The server is experiencing issues. Please try again later.".to_string()
                }
                _ => format!(
                    "The server returned an error (HTTP {}). Please try again.",
                    status
                ),
            },
            FetchError::NoData => "The server returned an empty response.".to_string(),
            FetchError::DecodingFailure(_) => {
                "Received an invalid response from the server. Please try again.".to_string()
            }
            FetchError::InvalidUrl(_) => "The service address is not valid.".to_string(),
            FetchError::InvalidRequest(reason) => format!("Invalid request: {}", reason),
        }
    }

    /// What the user can do about it, by category.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::NoConnectivity => "E_FETCH_OFFLINE",
            FetchError::NetworkFailure(_) => "E_FETCH_NET",
            FetchError::HttpError(_) => "E_FETCH_HTTP",
            FetchError::NoData => "E_FETCH_NODATA",
            FetchError::DecodingFailure(_) => "E_FETCH_DECODE",
            FetchError::InvalidUrl(_) => "E_FETCH_URL",
            FetchError::InvalidRequest(_) => "E_FETCH_ARGS",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::DecodingFailure(err.to_string())
    }
}
