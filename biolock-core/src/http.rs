//! Thin HTTP wrapper for the capability feed: timeout, user-agent, and
//! retries for transient failures.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a feed fetch. These never cross the feed-cache boundary.
#[derive(Debug, Error)]
pub(crate) enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request returned status {0}")]
    Status(u16),
}

impl FeedError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_timeout() || err.is_connect(),
            Self::Status(code) => *code == 429 || (500..=599).contains(code),
        }
    }
}

pub(crate) struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: usize,
}

impl HttpClient {
    pub(crate) fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(5),
            max_retries: 2, // total attempts = 3
        }
    }

    /// GETs `url` and decodes the JSON body, retrying transient failures
    /// with exponential backoff.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FeedError> {
        let request = || async {
            let response = self
                .client
                .get(url)
                .timeout(self.timeout)
                .header(
                    "User-Agent",
                    concat!("biolock-core/", env!("CARGO_PKG_VERSION")),
                )
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status(status.as_u16()));
            }
            Ok(response.json::<T>().await?)
        };
        request
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_delay(Duration::from_secs(2))
                    .with_max_times(self.max_retries),
            )
            .when(FeedError::is_transient)
            .await
    }
}
