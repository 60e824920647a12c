//! Crawl control endpoints.
//!
//! `POST /api/crawl` runs a batch synchronously and answers with the full
//! outcome; a dashboard that wants live numbers polls
//! `GET /api/crawl/progress` with the `sessionId` it chose up front. The
//! progress store is the session's sink, so polls see whatever the batch last
//! wrote.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crawler::{CrawlError, CrawlFailure, CrawlProgress, ExtractedArtist, ExtractedStudio};

use crate::server::app::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlRequest {
    /// Seed directory URLs; the built-in seed list when omitted or empty.
    pub directories: Option<Vec<String>>,
    pub max_studios: Option<usize>,
    /// Caller-chosen session id, so progress can be polled while the batch
    /// is still running. Server-generated when omitted.
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResponse {
    pub success: bool,
    pub session_id: String,
    pub studios: Vec<ExtractedStudio>,
    pub artists: Vec<ExtractedArtist>,
    pub errors: Vec<CrawlFailure>,
    pub discovered_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Run a discovery + crawl batch and return everything it found.
///
/// Per-URL failures land in `errors`; the request itself only fails on a
/// malformed body.
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Json<CrawlResponse> {
    let mut config = state.base_config.clone();
    if let Some(directories) = request.directories {
        if !directories.is_empty() {
            config = config.with_seeds(directories);
        }
    }
    let max_studios = request
        .max_studios
        .unwrap_or(config.max_studios)
        .min(state.max_studios_cap);
    config = config.with_max_studios(max_studios);

    info!(max_studios, "crawl requested");
    let outcome = state
        .scheduler
        .run(config, request.session_id, state.progress_store.clone())
        .await;

    Json(CrawlResponse {
        success: true,
        session_id: outcome.session_id,
        studios: outcome.studios,
        artists: outcome.artists,
        errors: outcome.errors,
        discovered_urls: outcome.discovered_urls,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub session_id: Option<String>,
}

/// Live progress for one session.
pub async fn progress_get_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<CrawlProgress>, (StatusCode, Json<ApiError>)> {
    let session_id = query.session_id.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("sessionId query parameter is required")),
        )
    })?;

    // The store is authoritative; the scheduler registry covers sessions
    // that published to some other sink.
    state
        .progress_store
        .get(&session_id)
        .or_else(|| state.scheduler.progress(&session_id))
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiError::new(format!("no session {session_id}"))),
            )
        })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAck {
    pub success: bool,
    pub session_id: String,
}

/// Publish a full progress record into the store.
///
/// Exists for out-of-process crawl workers; the in-process scheduler writes
/// through its sink instead.
pub async fn progress_post_handler(
    Extension(state): Extension<AppState>,
    Json(progress): Json<CrawlProgress>,
) -> Json<ProgressAck> {
    let session_id = progress.session_id.clone();
    state.progress_store.upsert(progress);
    Json(ProgressAck {
        success: true,
        session_id,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    pub session_id: String,
}

/// Cooperatively stop a running session and return its final progress.
pub async fn stop_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<StopRequest>,
) -> Result<Json<CrawlProgress>, (StatusCode, Json<ApiError>)> {
    match state.scheduler.stop(&request.session_id).await {
        Ok(progress) => {
            state.progress_store.upsert(progress.clone());
            Ok(Json(progress))
        }
        Err(CrawlError::SessionNotFound { session_id }) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!("no session {session_id}"))),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(e.to_string())),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::app::build_state;
    use crawler::testing::MockFetcher;
    use crawler::{CrawlConfig, CrawlStatus};
    use std::sync::Arc;

    const SEED: &str = "https://tattoo-navi.jp/studios/";

    fn test_state(fetcher: MockFetcher) -> AppState {
        build_state(
            Arc::new(fetcher),
            CrawlConfig::new().without_delays(),
            50,
        )
    }

    fn directory_state() -> AppState {
        let fetcher = MockFetcher::new()
            .with_page(
                SEED,
                r#"<a href="/studios/s1/">1</a><a href="/studios/s2/">2</a><a href="/studios/s3/">3</a>"#,
            )
            .with_pages((1..=3).map(|n| {
                (
                    format!("https://tattoo-navi.jp/studios/s{n}/"),
                    "<h1>Ink Studio</h1><p>東京 blackwork</p>",
                )
            }));
        test_state(fetcher)
    }

    #[tokio::test]
    async fn crawl_endpoint_returns_the_batch_outcome() {
        let state = directory_state();
        let request = CrawlRequest {
            directories: Some(vec![SEED.to_string()]),
            max_studios: Some(2),
            session_id: Some("api-test".to_string()),
        };

        let response = crawl_handler(Extension(state.clone()), Json(request)).await.0;

        assert!(response.success);
        assert_eq!(response.session_id, "api-test");
        assert_eq!(response.studios.len(), 2);
        assert!(response.artists.len() >= 2);
        assert_eq!(response.discovered_urls.len(), 3);

        // The run published into the store, so the progress endpoint serves it
        let progress = progress_get_handler(
            Extension(state),
            Query(ProgressQuery {
                session_id: Some("api-test".to_string()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(progress.status, CrawlStatus::Completed);
        assert_eq!(progress.studios_found, 2);
    }

    #[tokio::test]
    async fn requested_max_studios_is_clamped_to_the_cap() {
        let mut state = directory_state();
        state.max_studios_cap = 1;
        let request = CrawlRequest {
            directories: Some(vec![SEED.to_string()]),
            max_studios: Some(10),
            session_id: None,
        };

        let response = crawl_handler(Extension(state), Json(request)).await.0;
        assert_eq!(response.studios.len(), 1);
    }

    #[tokio::test]
    async fn progress_endpoint_requires_a_session_id() {
        let state = test_state(MockFetcher::new());
        let error = progress_get_handler(
            Extension(state),
            Query(ProgressQuery { session_id: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn progress_post_then_get_round_trips() {
        let state = test_state(MockFetcher::new());
        let progress = CrawlProgress::start("external-worker", 7);

        let ack =
            progress_post_handler(Extension(state.clone()), Json(progress)).await.0;
        assert!(ack.success);

        let got = progress_get_handler(
            Extension(state),
            Query(ProgressQuery {
                session_id: Some("external-worker".to_string()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(got.total_urls, 7);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = test_state(MockFetcher::new());

        let progress_error = progress_get_handler(
            Extension(state.clone()),
            Query(ProgressQuery {
                session_id: Some("missing".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(progress_error.0, StatusCode::NOT_FOUND);

        let stop_error = stop_handler(
            Extension(state),
            Json(StopRequest {
                session_id: "missing".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(stop_error.0, StatusCode::NOT_FOUND);
    }
}
