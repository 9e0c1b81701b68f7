use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Timed out after {timeout:?} fetching {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Failed to fetch URL: {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed with status {status} for URL: {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from: {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed feed at byte {position}: {message}")]
    Parse { message: String, position: u64 },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn parse(message: impl Into<String>, position: u64) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }
}
