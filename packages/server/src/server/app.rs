//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crawler::{CrawlConfig, CrawlScheduler, Fetcher, ProgressStore};

use crate::server::routes::{
    crawl_handler, health_handler, progress_get_handler, progress_post_handler, stop_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<CrawlScheduler>,
    pub progress_store: Arc<ProgressStore>,
    /// Per-run template; requests override seeds and max_studios on a clone.
    pub base_config: CrawlConfig,
    /// Hard cap applied on top of any requested maxStudios.
    pub max_studios_cap: usize,
}

/// Wire up the scheduler, the progress store and the crawl defaults.
pub fn build_state(
    fetcher: Arc<dyn Fetcher>,
    base_config: CrawlConfig,
    max_studios_cap: usize,
) -> AppState {
    AppState {
        scheduler: Arc::new(CrawlScheduler::new(fetcher)),
        progress_store: Arc::new(ProgressStore::new()),
        base_config,
        max_studios_cap,
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/crawl", post(crawl_handler))
        .route(
            "/api/crawl/progress",
            get(progress_get_handler).post(progress_post_handler),
        )
        .route("/api/crawl/stop", post(stop_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
