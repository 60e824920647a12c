//! Directory discovery: seed URLs in, unique studio URLs out.

use std::sync::Arc;

use indexmap::IndexSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{CrawlError, CrawlResult};
use crate::extract::urls::{extract_studio_urls, fallback_urls_for};
use crate::fetcher::Fetcher;

/// What one seed contributed to discovery.
#[derive(Debug)]
pub struct SeedOutcome {
    pub seed_url: String,
    /// Studio URLs this seed yielded (fetched or fallback)
    pub urls: Vec<String>,
    /// Fetch error, present when the fallback list was substituted (or the
    /// seed yielded nothing at all)
    pub error: Option<String>,
}

/// Drives the fetcher and link extraction over seed directory URLs.
///
/// Seeds are processed strictly sequentially; pacing between seeds is the
/// caller's job so discovery and crawling share one delay policy.
pub struct DirectoryDiscoverer {
    fetcher: Arc<dyn Fetcher>,
}

impl DirectoryDiscoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Process one seed: fetch it and extract studio links, degrading to the
    /// static fallback list for known hosts when the fetch fails.
    ///
    /// A failed fetch with a fallback is a degradation, not data loss: the
    /// outcome carries both the substituted URLs and the error text so the
    /// session can record the failure without dropping the seed.
    pub async fn discover_seed(
        &self,
        seed_url: &str,
        cancel: &CancellationToken,
    ) -> CrawlResult<SeedOutcome> {
        match self.fetcher.fetch(seed_url, cancel).await {
            Ok(html) => {
                let urls = extract_studio_urls(&html, seed_url);
                info!(seed = %seed_url, count = urls.len(), "seed discovered");
                Ok(SeedOutcome {
                    seed_url: seed_url.to_string(),
                    urls,
                    error: None,
                })
            }
            Err(e) if e.is_cancelled() => Err(CrawlError::Cancelled),
            Err(e) => {
                let fallback = fallback_urls_for(seed_url);
                warn!(
                    seed = %seed_url,
                    error = %e,
                    fallback_count = fallback.len(),
                    "seed fetch failed, substituting fallback URLs"
                );
                Ok(SeedOutcome {
                    seed_url: seed_url.to_string(),
                    urls: fallback,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Merge per-seed URL lists into one deduplicated, first-seen-ordered set.
    pub fn dedup_urls(outcomes: &[SeedOutcome]) -> Vec<String> {
        let mut set: IndexSet<String> = IndexSet::new();
        for outcome in outcomes {
            for url in &outcome.urls {
                set.insert(url.clone());
            }
        }
        set.into_iter().collect()
    }
}
