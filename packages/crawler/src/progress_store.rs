//! In-process progress store keyed by session id.
//!
//! A placeholder for a durable store: good for a single-process deployment,
//! replaced by an external keyed cache when horizontally scaled. Records are
//! evicted purely by age; an hourly sweep drops anything whose start time is
//! more than the TTL ago. No LRU, no size bound.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::session::ProgressSink;
use crate::types::CrawlProgress;

/// Default record lifetime and sweep cadence: one hour each.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Keyed in-memory map of progress records with TTL eviction.
pub struct ProgressStore {
    records: RwLock<HashMap<String, CrawlProgress>>,
    ttl: chrono::Duration,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore {
    /// Create a store with the default one-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a store with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
        }
    }

    /// Fetch a record by session id.
    pub fn get(&self, session_id: &str) -> Option<CrawlProgress> {
        self.records.read().unwrap().get(session_id).cloned()
    }

    /// Insert or replace a full record, keyed by its own session id.
    pub fn upsert(&self, progress: CrawlProgress) {
        self.records
            .write()
            .unwrap()
            .insert(progress.session_id.clone(), progress);
    }

    /// Remove a record. Returns whether one existed.
    pub fn remove(&self, session_id: &str) -> bool {
        self.records.write().unwrap().remove(session_id).is_some()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Drop every record older than the TTL. Returns how many were evicted.
    pub fn sweep(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|_, p| p.start_time > cutoff);
        let evicted = before - records.len();
        if evicted > 0 {
            debug!(evicted, remaining = records.len(), "progress store sweep");
        }
        evicted
    }

    /// Spawn the hourly background sweep. The task runs for the process
    /// lifetime; dropping the returned handle does not cancel it.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately; skip it so a fresh store isn't
            // swept before anything is written.
            interval.tick().await;
            loop {
                interval.tick().await;
                store.sweep();
            }
        })
    }
}

/// A running session publishes straight into the store, so the progress API
/// serves whatever the batch last wrote.
impl ProgressSink for ProgressStore {
    fn on_progress(&self, progress: &CrawlProgress) {
        self.upsert(progress.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ProgressSink;
    use crate::types::CrawlStatus;

    #[test]
    fn upsert_then_get_round_trips() {
        let store = ProgressStore::new();
        let progress = CrawlProgress::start("s1", 5);
        store.upsert(progress);

        let got = store.get("s1").unwrap();
        assert_eq!(got.total_urls, 5);
        assert_eq!(got.status, CrawlStatus::Running);
        assert!(store.get("s2").is_none());
    }

    #[test]
    fn upsert_replaces_by_session_id() {
        let store = ProgressStore::new();
        store.upsert(CrawlProgress::start("s1", 5));

        let mut updated = CrawlProgress::start("s1", 5);
        updated.processed_urls = 3;
        store.upsert(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("s1").unwrap().processed_urls, 3);
    }

    #[test]
    fn sweep_evicts_only_expired_records() {
        let store = ProgressStore::with_ttl(Duration::from_secs(3600));

        let mut old = CrawlProgress::start("old", 1);
        old.start_time = Utc::now() - chrono::Duration::hours(2);
        store.upsert(old);
        store.upsert(CrawlProgress::start("fresh", 1));

        assert_eq!(store.sweep(), 1);
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn sink_impl_publishes_into_the_store() {
        let store = ProgressStore::new();
        let progress = CrawlProgress::start("s1", 2);
        store.on_progress(&progress);

        assert_eq!(store.get("s1").unwrap().total_urls, 2);
    }
}
