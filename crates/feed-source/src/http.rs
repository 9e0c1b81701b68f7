//! HTTP/HTTPS feed fetcher

use crate::error::FetchError;
use crate::node::FeedNode;
use crate::xml::parse_document;
use crate::FeedSource;
use async_trait::async_trait;
use std::time::Duration;

/// Hard limit on a whole fetch, connection through body.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Some feed hosts reject default client identifiers, so present as a browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Options for [`HttpFeedSource`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches a feed from a fixed HTTP(S) URL.
///
/// No retries happen here; a failed fetch is reported and the next cycle
/// simply tries again.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>, options: FetchOptions) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
            timeout: options.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_error(&self, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: self.url.clone(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                url: self.url.clone(),
                source,
            }
        }
    }

    /// Fetch the raw response body.
    pub async fn fetch_text(&self) -> Result<String, FetchError> {
        tracing::info!("Fetching XML from: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| {
            if source.is_timeout() {
                self.request_error(source)
            } else {
                FetchError::Body {
                    url: self.url.clone(),
                    source,
                }
            }
        })?;

        tracing::debug!("Fetched {} bytes from: {}", body.len(), self.url);
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<FeedNode, FetchError> {
        let body = self.fetch_text().await?;
        let document = parse_document(&body)?;
        tracing::debug!("XML parsed successfully");
        Ok(document)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
