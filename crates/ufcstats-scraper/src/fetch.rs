//! Page fetching.

use crate::error::{ScrapeError, ScrapeResult};
use anyhow::{Context, Result};
use reqwest::Client;
use shared::config::ScraperConfig;
use tracing::{debug, warn};

/// Source of page bodies
///
/// The batch runner only needs the body of a URL; tests substitute a scripted
/// implementation.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&mut self, url: &str) -> ScrapeResult<String>;
}

/// HTTP fetcher for ufcstats pages
///
/// One request per call, no retries: a failed fetch fails the entity and the
/// batch moves on.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&mut self, url: &str) -> ScrapeResult<String> {
        debug!(url = %url, "Fetching page");

        let transport = |reason: String| ScrapeError::Transport {
            url: url.to_string(),
            reason,
        };

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Request error");
            transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Request failed");
            return Err(transport(format!("HTTP status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport(format!("failed to read body: {}", e)))?;
        debug!(url = %url, bytes = body.len(), "Page fetched");
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Fetcher answering from a script, in call order
    pub struct ScriptedFetcher {
        responses: VecDeque<ScrapeResult<String>>,
        pub requested: Vec<String>,
    }

    impl ScriptedFetcher {
        pub fn new(responses: Vec<ScrapeResult<String>>) -> Self {
            Self {
                responses: responses.into(),
                requested: Vec::new(),
            }
        }

        pub fn transport_error(url: &str) -> ScrapeError {
            ScrapeError::Transport {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            }
        }
    }

    impl Fetch for ScriptedFetcher {
        async fn fetch(&mut self, url: &str) -> ScrapeResult<String> {
            self.requested.push(url.to_string());
            self.responses
                .pop_front()
                .unwrap_or_else(|| Err(Self::transport_error(url)))
        }
    }

    #[test]
    fn test_http_fetcher_builds_from_config() {
        assert!(HttpFetcher::new(&ScraperConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_scripted_fetcher_runs_out() {
        let mut fetcher = ScriptedFetcher::new(vec![Ok("<html></html>".to_string())]);
        assert!(fetcher.fetch("http://a").await.is_ok());
        assert!(matches!(
            fetcher.fetch("http://b").await,
            Err(ScrapeError::Transport { .. })
        ));
        assert_eq!(fetcher.requested, vec!["http://a", "http://b"]);
    }
}
