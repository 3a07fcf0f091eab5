//! HTTP page fetching behind a narrow trait seam.
//!
//! The pipeline only ever needs "GET this URL, give me the body within this
//! timeout". [`PageFetcher`] captures exactly that, so tests can substitute
//! canned pages and the production [`ReqwestFetcher`] stays the single place
//! that knows about headers, TLS, and connection reuse.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::{instrument, warn};

use crate::errors::FetchError;

/// Browser-like User-Agent; the listing site serves degraded markup to
/// unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch one page body as text.
pub trait PageFetcher {
    /// GET `url` and return the body, failing with a [`FetchError`] on
    /// network error, timeout, or non-2xx status.
    async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// Production fetcher over a shared, connection-reusing [`reqwest::Client`].
///
/// Safe for concurrent use; all enrichment workers share one instance.
/// TLS certificate verification is disabled: the source site presents an
/// invalid chain, and this accommodation is scoped to this client only.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(ReqwestFetcher { client })
    }
}

impl PageFetcher for ReqwestFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
