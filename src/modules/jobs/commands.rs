use super::domain::repository::JobStatistics;
use super::progress_stream::progress_stream;
use crate::commands::AppState;
use crate::modules::separation::IsolationMode;
use crate::shared::errors::{AppError, AppResult};
use axum::extract::{Multipart, Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

const DEFAULT_UPLOAD_NAME: &str = "upload";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolateResponse {
    pub status: String,
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatusResponse {
    pub status: String,
    pub version: String,
    pub jobs: JobStatistics,
}

/// `POST /isolate`: accept an upload and start a job
///
/// Multipart fields: `file` (required) and `mode` (optional, lenient).
pub async fn isolate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<IsolateResponse>> {
    let mut upload: Option<(String, axum::body::Bytes)> = None;
    let mut mode = IsolationMode::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_NAME)
                    .to_string();
                let bytes = field.bytes().await?;
                upload = Some((file_name, bytes));
            }
            Some("mode") => {
                mode = IsolationMode::parse_lenient(&field.text().await?);
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unexpected multipart field");
            }
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;

    tracing::info!(file = %file_name, size = bytes.len(), %mode, "upload accepted");
    let job_id = state.scheduler.submit(bytes, &file_name, mode).await?;

    Ok(Json(IsolateResponse {
        status: "ok".to_string(),
        job_id: job_id.to_string(),
    }))
}

/// `GET /progress/:job_id`: live snapshots as server-sent events
pub async fn progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(%job_id, "progress subscriber attached");

    let events = progress_stream(state.jobs.clone(), &job_id, state.config.poll_interval).map(
        |snapshot| {
            let event = match serde_json::to_string(&snapshot) {
                Ok(json) => Event::default().data(json),
                Err(e) => Event::default().event("error").data(e.to_string()),
            };
            Ok(event)
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// `GET /status`: service version and job counts
pub async fn status(State(state): State<AppState>) -> AppResult<Json<ServiceStatusResponse>> {
    let jobs = state.jobs.get_statistics().await?;

    Ok(Json(ServiceStatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs,
    }))
}
