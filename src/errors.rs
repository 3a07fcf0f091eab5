//! Error taxonomy for the scrape pipeline.
//!
//! Only three failure shapes exist, and only one of them ends a run:
//!
//! - [`FetchError`]: a page-level HTTP failure (network, timeout, non-2xx).
//! - A structural parse miss: not an error at all; block parsers return
//!   `Option` and skipped blocks are logged at debug.
//! - [`RunFailure`]: a listing-level [`FetchError`]. Detail-page fetch errors
//!   are absorbed per candidate and never become a `RunFailure`.

use thiserror::Error;

/// An HTTP fetch that did not produce a usable page body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network or protocol failure before a status was obtained.
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The per-request timeout elapsed.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    /// Classify a `reqwest` transport error, separating timeouts so tests and
    /// logs can tell them apart from connection failures.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// The only condition that aborts a run.
///
/// Callers holding a previously published snapshot must keep it on this
/// result rather than publishing anything new.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("listing fetch failed: {0}")]
    Listing(#[from] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_names_url_and_code() {
        let err = FetchError::Status {
            url: "https://example.test/listing".to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.test/listing"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_run_failure_wraps_fetch_error() {
        let fetch = FetchError::Timeout {
            url: "https://example.test".to_string(),
        };
        let failure = RunFailure::from(fetch);
        assert!(matches!(failure, RunFailure::Listing(FetchError::Timeout { .. })));
    }
}
