use super::infrastructure::content_type_for;
use crate::commands::AppState;
use crate::shared::errors::{AppError, AppResult};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

/// `GET /media/*path`: stream a stored artifact
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<Response> {
    let file_path = state.storage.resolve(&path)?;

    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| AppError::NotFound(format!("Media not found: {}", path)))?;
    if !metadata.is_file() {
        return Err(AppError::NotFound(format!("Media not found: {}", path)));
    }

    let file = tokio::fs::File::open(&file_path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&file_path).to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}
