//! HTTP fetching with browser-like headers, timeout, bounded retry and
//! cooperative cancellation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::types::CrawlConfig;

/// Fetches one URL to raw HTML. The seam the scheduler and discoverer mock in
/// tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL, honoring the cancellation token at every suspension
    /// point. Cancellation surfaces as [`CrawlError::Cancelled`] and is never
    /// retried.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> CrawlResult<String>;
}

/// Production fetcher backed by reqwest.
///
/// Sends a realistic desktop-browser header set; some studio sites reject
/// obviously non-browser clients on sight. Failures are retried up to
/// `max_retries` times with a linearly increasing delay
/// (`retry_base_delay × attempt`). No retry distinction is made between 4xx
/// and 5xx responses.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with production defaults (10s timeout, 3 retries,
    /// 1s backoff base).
    pub fn new() -> Self {
        Self::with_settings(Duration::from_secs(10), 3, Duration::from_secs(1))
    }

    /// Create a fetcher matching a crawl config's network settings.
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::with_settings(
            config.request_timeout,
            config.max_retries,
            config.retry_base_delay,
        )
    }

    /// Create a fetcher with explicit settings.
    pub fn with_settings(timeout: Duration, max_retries: u32, retry_base_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .default_headers(browser_headers())
                .build()
                .expect("Failed to create HTTP client"),
            max_retries,
            retry_base_delay,
        }
    }

    async fn fetch_once(&self, url: &str) -> CrawlResult<String> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CrawlError::Timeout {
                    url: url.to_string(),
                }
            } else {
                CrawlError::Http(Box::new(e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response.text().await.map_err(|e| CrawlError::Http(Box::new(e)))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> CrawlResult<String> {
        fetch_with_retry(url, cancel, self.max_retries, self.retry_base_delay, || {
            self.fetch_once(url)
        })
        .await
    }
}

/// Retry loop shared by the production fetcher (and testable without a
/// network): `max_retries + 1` attempts, linear backoff, immediate exit on
/// cancellation.
pub(crate) async fn fetch_with_retry<F, Fut>(
    url: &str,
    cancel: &CancellationToken,
    max_retries: u32,
    base_delay: Duration,
    mut attempt_fn: F,
) -> CrawlResult<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CrawlResult<String>>,
{
    if cancel.is_cancelled() {
        return Err(CrawlError::Cancelled);
    }

    let mut last_error = None;
    for attempt in 1..=max_retries + 1 {
        let result = tokio::select! {
            r = attempt_fn() => r,
            _ = cancel.cancelled() => Err(CrawlError::Cancelled),
        };

        match result {
            Ok(html) => return Ok(html),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(url = %url, attempt, error = %e, "fetch attempt failed");
                last_error = Some(e);
            }
        }

        if attempt <= max_retries {
            let backoff = base_delay * attempt;
            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = cancel.cancelled() => return Err(CrawlError::Cancelled),
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| CrawlError::Http(format!("no attempts made for {url}").into())))
}

/// Realistic desktop-browser header set.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );
    headers
}
