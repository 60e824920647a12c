//! Testing utilities: a scriptable fetcher that never touches the network.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{CrawlError, CrawlResult};
use crate::fetcher::Fetcher;

/// A mock fetcher returning predefined HTML by URL.
///
/// Unknown URLs fail, listed URLs can be forced to fail, and an optional
/// per-fetch delay makes cancellation mid-fetch testable. All fetches are
/// recorded for assertions.
#[derive(Default)]
pub struct MockFetcher {
    /// Predefined HTML by URL
    pages: Arc<RwLock<HashMap<String, String>>>,

    /// URLs that should fail with a connection error
    fail_urls: Arc<RwLock<Vec<String>>>,

    /// Simulated network latency per fetch
    delay: Option<Duration>,

    /// Fetched URLs, in order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Add multiple predefined pages.
    pub fn with_pages<U, H>(self, pages: impl IntoIterator<Item = (U, H)>) -> Self
    where
        U: Into<String>,
        H: Into<String>,
    {
        {
            let mut store = self.pages.write().unwrap();
            for (url, html) in pages {
                store.insert(url.into(), html.into());
            }
        }
        self
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// Simulate network latency on every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches for one URL.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> CrawlResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            }
        }

        if self.fail_urls.read().unwrap().contains(&url.to_string()) {
            return Err(CrawlError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Mock connection refused",
            ))));
        }

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| CrawlError::InvalidUrl {
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_returns_scripted_page() {
        let fetcher = MockFetcher::new().with_page("https://a.example/", "<html>a</html>");

        let html = fetcher
            .fetch("https://a.example/", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(html, "<html>a</html>");
        assert_eq!(fetcher.call_count("https://a.example/"), 1);
    }

    #[tokio::test]
    async fn unknown_and_failing_urls_error() {
        let fetcher = MockFetcher::new().fail_url("https://down.example/");
        let cancel = CancellationToken::new();

        assert!(fetcher.fetch("https://down.example/", &cancel).await.is_err());
        assert!(fetcher.fetch("https://missing.example/", &cancel).await.is_err());
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn delayed_fetch_honors_cancellation() {
        let fetcher = MockFetcher::new()
            .with_page("https://slow.example/", "<html>")
            .with_delay(Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let result = fetcher.fetch("https://slow.example/", &cancel).await;
        assert!(matches!(result, Err(CrawlError::Cancelled)));
    }
}
