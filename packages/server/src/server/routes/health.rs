use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    active_sessions: usize,
    tracked_sessions: usize,
}

/// Health check endpoint
///
/// Reports how many crawl sessions are running and how many progress records
/// the store currently tracks. Always 200; there is no external dependency to
/// probe.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        active_sessions: state.scheduler.active_sessions(),
        tracked_sessions: state.progress_store.len(),
    };
    (StatusCode::OK, Json(response))
}
