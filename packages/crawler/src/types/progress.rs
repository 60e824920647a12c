//! Mutable progress state for a crawl session.
//!
//! `CrawlProgress` is the wire format the admin dashboard polls, so it
//! serializes in camelCase. Counters are updated strictly after each unit of
//! work; `errors.len()` always equals `failed_crawls`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a crawl session.
///
/// `Idle` is the pre-start resting state only; a run that finishes without a
/// stop request terminates in `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Idle,
    Running,
    Stopping,
    Stopped,
    Completed,
    Error,
}

impl CrawlStatus {
    /// Whether the session is past the point of doing more work.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CrawlStatus::Stopped | CrawlStatus::Completed | CrawlStatus::Error
        )
    }
}

/// One failed URL, as accumulated into the progress record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Progress snapshot for one crawl session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlProgress {
    pub session_id: String,
    pub total_urls: usize,
    pub processed_urls: usize,
    pub successful_crawls: usize,
    pub failed_crawls: usize,
    pub studios_found: usize,
    pub artists_found: usize,
    pub current_url: Option<String>,
    pub status: CrawlStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub errors: Vec<CrawlFailure>,
    /// Linear extrapolation in whole seconds; absent until one URL completes
    pub estimated_time_remaining: Option<u64>,
}

impl CrawlProgress {
    /// Create a zeroed progress record in the `Running` state.
    pub fn start(session_id: impl Into<String>, total_urls: usize) -> Self {
        Self {
            session_id: session_id.into(),
            total_urls,
            processed_urls: 0,
            successful_crawls: 0,
            failed_crawls: 0,
            studios_found: 0,
            artists_found: 0,
            current_url: None,
            status: CrawlStatus::Running,
            start_time: Utc::now(),
            errors: Vec::new(),
            estimated_time_remaining: None,
        }
    }

    /// Record a failed URL, keeping `errors.len()` in step with the counter.
    pub fn record_failure(&mut self, url: impl Into<String>, error: impl Into<String>) {
        self.failed_crawls += 1;
        self.errors.push(CrawlFailure {
            url: url.into(),
            error: error.into(),
            timestamp: Utc::now(),
        });
    }

    /// Recompute the time-remaining estimate from elapsed wall time.
    ///
    /// A linear extrapolation, `elapsed / processed × remaining`, good enough
    /// for a dashboard progress bar.
    pub fn update_estimate(&mut self) {
        if self.processed_urls == 0 {
            self.estimated_time_remaining = None;
            return;
        }
        let elapsed = (Utc::now() - self.start_time).num_seconds().max(0) as u64;
        let remaining = self.total_urls.saturating_sub(self.processed_urls) as u64;
        self.estimated_time_remaining =
            Some(elapsed * remaining / self.processed_urls.max(1) as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_counter_tracks_error_list() {
        let mut progress = CrawlProgress::start("s1", 3);
        progress.record_failure("https://a.example", "HTTP 500: Internal Server Error");
        progress.record_failure("https://b.example", "timeout");

        assert_eq!(progress.failed_crawls, 2);
        assert_eq!(progress.errors.len(), progress.failed_crawls);
        assert_eq!(progress.errors[0].url, "https://a.example");
    }

    #[test]
    fn estimate_absent_before_first_unit() {
        let mut progress = CrawlProgress::start("s1", 10);
        progress.update_estimate();
        assert_eq!(progress.estimated_time_remaining, None);

        progress.processed_urls = 5;
        progress.update_estimate();
        assert!(progress.estimated_time_remaining.is_some());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&CrawlStatus::Stopping).unwrap();
        assert_eq!(json, "\"stopping\"");
    }

    #[test]
    fn progress_serializes_camel_case() {
        let progress = CrawlProgress::start("s1", 1);
        let json = serde_json::to_value(&progress).unwrap();
        assert!(json.get("totalUrls").is_some());
        assert!(json.get("processedUrls").is_some());
        assert!(json.get("startTime").is_some());
    }

    #[test]
    fn terminal_states() {
        assert!(CrawlStatus::Completed.is_terminal());
        assert!(CrawlStatus::Stopped.is_terminal());
        assert!(!CrawlStatus::Running.is_terminal());
        assert!(!CrawlStatus::Stopping.is_terminal());
    }
}
