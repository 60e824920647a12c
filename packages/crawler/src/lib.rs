//! Studio/artist web crawler and heuristic HTML-extraction pipeline.
//!
//! The pipeline is a two-phase batch job: directory seeds are fetched and
//! mined for studio links, then each studio page is fetched and pushed
//! through regex heuristics that assemble partial studio and artist records.
//! Progress is tracked per session, streamed to a [`ProgressSink`], and the
//! whole batch is cancellable mid-flight.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crawler::{CrawlConfig, CrawlScheduler, HttpFetcher, ProgressStore};
//!
//! let store = Arc::new(ProgressStore::new());
//! let scheduler = CrawlScheduler::new(Arc::new(HttpFetcher::new()));
//!
//! let config = CrawlConfig::new().with_max_studios(20);
//! let outcome = scheduler.run(config, None, store.clone()).await;
//! println!("{} studios, {} artists", outcome.studios.len(), outcome.artists.len());
//! ```
//!
//! # Modules
//!
//! - [`fetcher`] - HTTP fetching with retry, timeout and cancellation
//! - [`extract`] - regex/string field-extraction heuristics
//! - [`discovery`] - seed-directory discovery with fallback degradation
//! - [`session`] - session registry, scheduler, cooperative stop
//! - [`progress_store`] - keyed in-memory progress map with TTL sweep
//! - [`gateway`] - persistence seam the data layer implements
//! - [`testing`] - scriptable mock fetcher

pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod gateway;
pub mod progress_store;
pub mod session;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use discovery::{DirectoryDiscoverer, SeedOutcome};
pub use error::{CrawlError, CrawlResult, GatewayError, GatewayResult};
pub use extract::{extract_studio_page, strip_tags};
pub use fetcher::{Fetcher, HttpFetcher};
pub use gateway::{MemoryGateway, PersistenceGateway};
pub use progress_store::ProgressStore;
pub use session::{CrawlOutcome, CrawlScheduler, NullSink, Pacer, ProgressSink};
pub use types::{
    CrawlConfig, CrawlFailure, CrawlProgress, CrawlStatus, ExtractedArtist, ExtractedStudio,
    StudioPage,
};
