//! Crawl session orchestration: the two-phase batch job, its registry, and
//! cooperative stop.
//!
//! Sessions are addressed by id in a registry, never a singleton field, so a
//! second concurrent `run()` cannot orphan the handle needed to stop the
//! first. One logical session processes URLs strictly sequentially; there is
//! no fetch fan-out, which bounds load on remote sites and keeps progress
//! updates totally ordered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::discovery::DirectoryDiscoverer;
use crate::error::{CrawlError, CrawlResult};
use crate::extract::extract_studio_page;
use crate::fetcher::Fetcher;
use crate::types::{
    CrawlConfig, CrawlFailure, CrawlProgress, CrawlStatus, ExtractedArtist, ExtractedStudio,
};

/// Push-model observer for progress updates. Called after every state
/// mutation, so consumers never poll internal state.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: &CrawlProgress);
}

/// Sink that discards updates.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _progress: &CrawlProgress) {}
}

/// The single inter-item delay policy, shared by the discovery phase, the
/// crawl phase and the API layer. Sleeps are cut short by cancellation.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait out the configured delay, returning early on cancellation.
    pub async fn pause(&self, cancel: &CancellationToken) {
        if self.delay.is_zero() || cancel.is_cancelled() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {}
            _ = cancel.cancelled() => {}
        }
    }
}

/// Everything a finished run hands back to the caller for persistence or
/// review.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub session_id: String,
    pub studios: Vec<ExtractedStudio>,
    pub artists: Vec<ExtractedArtist>,
    pub errors: Vec<CrawlFailure>,
    pub discovered_urls: Vec<String>,
}

/// Shared state for one registered session.
struct SessionState {
    progress: Mutex<CrawlProgress>,
    cancel: CancellationToken,
    /// True while a fetch is on the wire; `stop()` waits on this (bounded by
    /// the grace period) instead of sleeping blindly.
    in_flight: watch::Sender<bool>,
    stop_grace: Duration,
    sink: Arc<dyn ProgressSink>,
}

impl SessionState {
    fn new(
        session_id: &str,
        total_urls: usize,
        stop_grace: Duration,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            progress: Mutex::new(CrawlProgress::start(session_id, total_urls)),
            cancel: CancellationToken::new(),
            in_flight: watch::channel(false).0,
            stop_grace,
            sink,
        }
    }

    fn is_running(&self) -> bool {
        self.progress.lock().unwrap().status == CrawlStatus::Running
    }

    /// Mutate progress under the lock, then push the snapshot to the sink.
    fn update(&self, f: impl FnOnce(&mut CrawlProgress)) {
        let snapshot = {
            let mut progress = self.progress.lock().unwrap();
            f(&mut progress);
            progress.clone()
        };
        self.sink.on_progress(&snapshot);
    }

    fn snapshot(&self) -> CrawlProgress {
        self.progress.lock().unwrap().clone()
    }

    /// Run a fetch-ish future with the in-flight flag raised around it.
    async fn guarded<F: std::future::Future>(&self, fut: F) -> F::Output {
        let _ = self.in_flight.send(true);
        let out = fut.await;
        let _ = self.in_flight.send(false);
        out
    }
}

/// Orchestrates discovery + crawl batches and tracks every live session.
pub struct CrawlScheduler {
    fetcher: Arc<dyn Fetcher>,
    sessions: RwLock<HashMap<String, Arc<SessionState>>>,
}

impl CrawlScheduler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Run a full discovery + crawl batch.
    ///
    /// Never fails as a whole: per-URL failures are isolated into the
    /// progress record and the outcome's error list
    /// (`errors.len() == failed_crawls` at every snapshot).
    pub async fn run(
        &self,
        config: CrawlConfig,
        session_id: Option<String>,
        sink: Arc<dyn ProgressSink>,
    ) -> CrawlOutcome {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let state = Arc::new(SessionState::new(
            &session_id,
            config.seed_urls.len(),
            config.stop_grace,
            sink,
        ));
        self.sessions
            .write()
            .unwrap()
            .insert(session_id.clone(), state.clone());

        info!(session_id = %session_id, seeds = config.seed_urls.len(), "crawl session starting");
        state.update(|_| {});

        // Phase 1: discovery over the seed list.
        let discoverer = DirectoryDiscoverer::new(self.fetcher.clone());
        let seed_pacer = Pacer::new(config.seed_delay);
        let mut seed_outcomes = Vec::new();

        for seed in &config.seed_urls {
            if !state.is_running() {
                break;
            }
            state.update(|p| p.current_url = Some(seed.clone()));

            match state
                .guarded(discoverer.discover_seed(seed, &state.cancel))
                .await
            {
                Ok(outcome) => {
                    if let Some(error) = &outcome.error {
                        state.update(|p| p.record_failure(seed, error.clone()));
                    }
                    seed_outcomes.push(outcome);
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => state.update(|p| p.record_failure(seed, e.to_string())),
            }

            state.update(|p| {
                p.processed_urls += 1;
                p.update_estimate();
            });
            seed_pacer.pause(&state.cancel).await;
        }

        let discovered_urls = DirectoryDiscoverer::dedup_urls(&seed_outcomes);
        let selected: Vec<String> = discovered_urls
            .iter()
            .take(config.max_studios)
            .cloned()
            .collect();

        // Discovery revises the total upward: seeds plus the selected pages.
        state.update(|p| {
            p.total_urls = config.seed_urls.len() + selected.len();
            p.update_estimate();
        });
        info!(
            session_id = %session_id,
            discovered = discovered_urls.len(),
            selected = selected.len(),
            "discovery phase complete"
        );

        // Phase 2: crawl each selected studio page.
        let page_pacer = Pacer::new(config.page_delay);
        let mut studios = Vec::new();
        let mut artists = Vec::new();

        for url in &selected {
            // Cooperative-cancellation check point: a stop request lands here
            // at the latest.
            if !state.is_running() {
                break;
            }
            state.update(|p| p.current_url = Some(url.clone()));

            let fetched = state
                .guarded(self.fetcher.fetch(url, &state.cancel))
                .await;

            match fetched {
                Ok(html) => {
                    let page = extract_studio_page(&html, url);
                    state.update(|p| {
                        p.successful_crawls += 1;
                        p.studios_found += 1;
                        p.artists_found += page.artists.len();
                    });
                    studios.push(page.studio);
                    artists.extend(page.artists);
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    warn!(session_id = %session_id, url = %url, error = %e, "studio crawl failed");
                    state.update(|p| p.record_failure(url, e.to_string()));
                }
            }

            state.update(|p| {
                p.processed_urls += 1;
                p.update_estimate();
            });
            page_pacer.pause(&state.cancel).await;
        }

        // Terminal transition: untouched-by-stop runs complete; stopped runs
        // keep the status `stop()` gave them.
        state.update(|p| {
            if p.status == CrawlStatus::Running {
                p.status = CrawlStatus::Completed;
            }
            p.current_url = None;
        });

        let final_progress = state.snapshot();
        info!(
            session_id = %session_id,
            status = ?final_progress.status,
            studios = studios.len(),
            artists = artists.len(),
            failed = final_progress.failed_crawls,
            "crawl session finished"
        );

        // The sink already holds the final snapshot; dropping the registry
        // entry keeps the map bounded by the number of live runs.
        self.sessions.write().unwrap().remove(&session_id);

        CrawlOutcome {
            session_id,
            studios,
            artists,
            errors: final_progress.errors,
            discovered_urls,
        }
    }

    /// Cooperatively stop a session.
    ///
    /// Flips the session to `stopping`, cancels the in-flight fetch, then
    /// waits for the in-flight flag to drop, bounded by the session's grace
    /// period, so a fetch that ignores cancellation cannot wedge the stop.
    /// Finished runs leave the registry, so stopping one is `SessionNotFound`;
    /// their final state lives in whatever sink they published to.
    pub async fn stop(&self, session_id: &str) -> CrawlResult<CrawlProgress> {
        let state = self
            .sessions
            .read()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| CrawlError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;

        info!(session_id = %session_id, "stop requested");
        state.update(|p| {
            if !p.status.is_terminal() {
                p.status = CrawlStatus::Stopping;
            }
        });
        state.cancel.cancel();

        let mut in_flight = state.in_flight.subscribe();
        let drained = async {
            while *in_flight.borrow() {
                if in_flight.changed().await.is_err() {
                    break;
                }
            }
        };
        if tokio::time::timeout(state.stop_grace, drained).await.is_err() {
            warn!(session_id = %session_id, "in-flight request did not unwind within grace period");
        }

        state.update(|p| {
            if !p.status.is_terminal() {
                p.status = CrawlStatus::Stopped;
            }
        });
        Ok(state.snapshot())
    }

    /// Progress snapshot for one session, if registered.
    pub fn progress(&self, session_id: &str) -> Option<CrawlProgress> {
        self.sessions
            .read()
            .unwrap()
            .get(session_id)
            .map(|s| s.snapshot())
    }

    /// Number of sessions still doing work.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| !s.snapshot().status.is_terminal())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pacer_returns_immediately_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let start = std::time::Instant::now();
        Pacer::new(Duration::from_secs(60)).pause(&cancel).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn stop_on_unknown_session_is_not_found() {
        let scheduler = CrawlScheduler::new(Arc::new(crate::testing::MockFetcher::new()));
        let result = scheduler.stop("no-such-session").await;
        assert!(matches!(result, Err(CrawlError::SessionNotFound { .. })));
    }

    #[tokio::test]
    async fn finished_run_is_evicted_from_the_registry() {
        let scheduler = CrawlScheduler::new(Arc::new(crate::testing::MockFetcher::new()));
        let store = Arc::new(crate::progress_store::ProgressStore::new());
        let config = CrawlConfig::new().with_seeds(Vec::<String>::new()).without_delays();

        let outcome = scheduler
            .run(config, Some("fixed-id".to_string()), store.clone())
            .await;

        assert_eq!(outcome.session_id, "fixed-id");
        // The registry only tracks live runs; the sink keeps the final state
        assert!(scheduler.progress("fixed-id").is_none());
        assert_eq!(scheduler.active_sessions(), 0);
        assert_eq!(store.get("fixed-id").unwrap().status, CrawlStatus::Completed);

        // A finished session is no longer stoppable
        let result = scheduler.stop("fixed-id").await;
        assert!(matches!(result, Err(CrawlError::SessionNotFound { .. })));
    }
}
