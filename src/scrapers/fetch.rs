//! HTTP access to listing pages.

use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Anything that can return the HTML of a listing page.
///
/// The live implementation is [`HttpFetcher`]; tests substitute canned pages.
pub trait PageSource {
    async fn fetch_page(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// Fetches pages over HTTP with a fixed timeout and browser-like user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?.error_for_status()?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_fetcher_builds() {
        let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_secs(10));
        assert!(fetcher.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let fetcher = HttpFetcher::new("Mozilla/5.0", Duration::from_millis(500)).unwrap();
        let result = fetcher.fetch_page("http://127.0.0.1:1/news").await;
        assert!(result.is_err());
    }
}
