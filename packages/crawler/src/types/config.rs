//! Configuration for crawl sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extract::patterns::DEFAULT_SEED_URLS;

/// Configuration for one crawl session.
///
/// Defaults match the production politeness settings: 2s between directory
/// seeds, 3s between studio pages, 10s request timeout, 3 retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Directory/studio seed URLs to start discovery from.
    pub seed_urls: Vec<String>,

    /// Cap on studio pages crawled after discovery.
    pub max_studios: usize,

    /// Delay between directory seed fetches.
    #[serde(with = "duration_millis")]
    pub seed_delay: Duration,

    /// Delay between studio page fetches.
    #[serde(with = "duration_millis")]
    pub page_delay: Duration,

    /// Per-request timeout.
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,

    /// Retries per URL after the first attempt.
    pub max_retries: u32,

    /// Base for the linearly increasing retry backoff.
    #[serde(with = "duration_millis")]
    pub retry_base_delay: Duration,

    /// Upper bound on how long `stop()` waits for an in-flight request.
    #[serde(with = "duration_millis")]
    pub stop_grace: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: DEFAULT_SEED_URLS.iter().map(|s| s.to_string()).collect(),
            max_studios: 50,
            seed_delay: Duration::from_secs(2),
            page_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            stop_grace: Duration::from_secs(1),
        }
    }
}

impl CrawlConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the seed URL list.
    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.seed_urls = seeds.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Set the studio page cap.
    pub fn with_max_studios(mut self, max: usize) -> Self {
        self.max_studios = max;
        self
    }

    /// Set the inter-seed delay.
    pub fn with_seed_delay(mut self, delay: Duration) -> Self {
        self.seed_delay = delay;
        self
    }

    /// Set the inter-page delay.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set the retry count.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the stop grace period.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Zero all delays. Test configs use this so runs finish instantly.
    pub fn without_delays(mut self) -> Self {
        self.seed_delay = Duration::ZERO;
        self.page_delay = Duration::ZERO;
        self.retry_base_delay = Duration::ZERO;
        self.stop_grace = Duration::ZERO;
        self
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_polite() {
        let config = CrawlConfig::default();
        assert_eq!(config.seed_delay, Duration::from_secs(2));
        assert_eq!(config.page_delay, Duration::from_secs(3));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.seed_urls.len(), 7);
    }

    #[test]
    fn builder_overrides() {
        let config = CrawlConfig::new()
            .with_seeds(["https://example.jp/"])
            .with_max_studios(2)
            .without_delays();

        assert_eq!(config.seed_urls, vec!["https://example.jp/"]);
        assert_eq!(config.max_studios, 2);
        assert_eq!(config.page_delay, Duration::ZERO);
    }

    #[test]
    fn durations_round_trip_as_millis() {
        let config = CrawlConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["seed_delay"], 2000);

        let back: CrawlConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.seed_delay, Duration::from_secs(2));
    }
}
