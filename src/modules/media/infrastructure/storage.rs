/// Media storage
///
/// Owns the on-disk layout: raw uploads go to a scratch directory, each job
/// works inside `<media_root>/<job_id>/`, and finished artifacts are addressed
/// by URL paths under `/media/`.
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_warn};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// URL prefix the media root is mounted at
pub const MEDIA_URL_PREFIX: &str = "/media";

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct MediaStorage {
    media_root: PathBuf,
    scratch_dir: PathBuf,
}

impl MediaStorage {
    pub fn new(media_root: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Create the media root and scratch directory if missing
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.media_root).await?;
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        Ok(())
    }

    /// Persist an upload to a uniquely named scratch file
    ///
    /// The file keeps the upload's extension (video detection depends on it).
    pub async fn save_upload<B>(&self, file_name: &str, bytes: B) -> AppResult<PathBuf>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let suffix = upload_suffix(file_name);
        let scratch_dir = self.scratch_dir.clone();

        let path = tokio::task::spawn_blocking(move || -> AppResult<PathBuf> {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&scratch_dir)?;
            file.write_all(bytes.as_ref())?;
            file.flush()?;
            let (_, path) = file
                .keep()
                .map_err(|e| AppError::StorageError(format!("Failed to keep upload: {}", e)))?;
            Ok(path)
        })
        .await??;

        log_debug!("Stored upload '{}' at {}", file_name, path.display());
        Ok(path)
    }

    /// Create the isolated working directory for a job
    pub async fn create_job_dir(&self, job_id: Uuid) -> AppResult<PathBuf> {
        let dir = self.job_dir(job_id);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    pub fn job_dir(&self, job_id: Uuid) -> PathBuf {
        self.media_root.join(job_id.to_string())
    }

    /// Delete a scratch upload; a file that is already gone is not an error
    pub async fn remove_scratch(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => log_debug!("Removed scratch file {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log_warn!("Failed to remove scratch file {}: {}", path.display(), e),
        }
    }

    /// URL path (`/media/...`) of an artifact stored under the media root
    pub fn artifact_url(&self, artifact: &Path) -> AppResult<String> {
        let relative = artifact.strip_prefix(&self.media_root).map_err(|_| {
            AppError::InternalError(format!(
                "Artifact {} is outside the media root",
                artifact.display()
            ))
        })?;

        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        Ok(format!("{}/{}", MEDIA_URL_PREFIX, segments.join("/")))
    }

    /// Map a request path onto a file below the media root
    ///
    /// Only plain segments are accepted; `..`, absolute paths and prefixes
    /// are rejected so requests cannot escape the root.
    pub fn resolve(&self, request_path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        let mut resolved = self.media_root.clone();
        let mut segments = 0;

        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    segments += 1;
                }
                Component::CurDir => {}
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "Invalid media path: {}",
                        request_path
                    )))
                }
            }
        }

        if segments == 0 {
            return Err(AppError::NotFound("Empty media path".to_string()));
        }
        Ok(resolved)
    }
}

/// `.ext` taken from the original file name, or empty when unusable
fn upload_suffix(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Content type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
