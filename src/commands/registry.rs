use super::AppState;
use crate::modules::jobs::commands::{isolate, progress, status};
use crate::modules::media::commands::serve_media;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

/// Single source of truth for every HTTP route
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Jobs
        .route("/isolate", post(isolate))
        .route("/progress/:job_id", get(progress))
        .route("/status", get(status))
        // Artifacts
        .route("/media/*path", get(serve_media))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
