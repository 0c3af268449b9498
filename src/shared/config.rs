/// Service configuration
///
/// Values come from the process environment (optionally seeded by a `.env`
/// file through `dotenvy`). Every key has a default so the service boots with
/// no configuration at all.
use crate::shared::errors::{AppError, AppResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MEDIA_DIR: &str = "/media";
const DEFAULT_SEPARATOR_BIN: &str = "demucs";
const DEFAULT_SEPARATOR_MODEL: &str = "htdemucs";
const DEFAULT_TRANSCODER_BIN: &str = "ffmpeg";
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_UPLOAD_MB: usize = 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// Shared media root; each job gets `<media_dir>/<job_id>/`
    pub media_dir: PathBuf,
    /// Where raw uploads are parked until their job finishes
    pub scratch_dir: PathBuf,
    pub separator_bin: String,
    pub separator_model: String,
    pub transcoder_bin: String,
    pub poll_interval: Duration,
    pub max_upload_bytes: usize,
    /// Terminal jobs older than this are reaped; `None` keeps them forever
    pub job_retention: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8000))),
            media_dir: PathBuf::from(DEFAULT_MEDIA_DIR),
            scratch_dir: std::env::temp_dir(),
            separator_bin: DEFAULT_SEPARATOR_BIN.to_string(),
            separator_model: DEFAULT_SEPARATOR_MODEL.to_string(),
            transcoder_bin: DEFAULT_TRANSCODER_BIN.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            job_retention: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr = match get("ISOLATOR_LISTEN_ADDR") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::InvalidInput(format!("ISOLATOR_LISTEN_ADDR '{}': {}", raw, e))
            })?,
            None => defaults.listen_addr,
        };

        let poll_interval = match get("ISOLATOR_POLL_INTERVAL_MS") {
            Some(raw) => {
                let ms: u64 = raw.parse()?;
                if ms == 0 {
                    return Err(AppError::InvalidInput(
                        "ISOLATOR_POLL_INTERVAL_MS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_millis(ms)
            }
            None => defaults.poll_interval,
        };

        let max_upload_bytes = match get("ISOLATOR_MAX_UPLOAD_MB") {
            Some(raw) => raw
                .parse::<usize>()?
                .checked_mul(1024 * 1024)
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("ISOLATOR_MAX_UPLOAD_MB '{}' is too large", raw))
                })?,
            None => defaults.max_upload_bytes,
        };

        let job_retention = match get("ISOLATOR_JOB_RETENTION_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.parse()?)),
            None => None,
        };

        Ok(Self {
            listen_addr,
            media_dir: get("ISOLATOR_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_dir),
            scratch_dir: get("ISOLATOR_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            separator_bin: get("ISOLATOR_SEPARATOR_BIN").unwrap_or(defaults.separator_bin),
            separator_model: get("ISOLATOR_SEPARATOR_MODEL").unwrap_or(defaults.separator_model),
            transcoder_bin: get("ISOLATOR_TRANSCODER_BIN").unwrap_or(defaults.transcoder_bin),
            poll_interval,
            max_upload_bytes,
            job_retention,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.listen_addr.port(), 8000);
        assert_eq!(cfg.media_dir, PathBuf::from("/media"));
        assert_eq!(cfg.separator_bin, "demucs");
        assert_eq!(cfg.separator_model, "htdemucs");
        assert_eq!(cfg.transcoder_bin, "ffmpeg");
        assert_eq!(cfg.poll_interval, Duration::from_millis(500));
        assert!(cfg.job_retention.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("ISOLATOR_LISTEN_ADDR", "127.0.0.1:9000"),
            ("ISOLATOR_MEDIA_DIR", "/srv/media"),
            ("ISOLATOR_POLL_INTERVAL_MS", "250"),
            ("ISOLATOR_MAX_UPLOAD_MB", "10"),
            ("ISOLATOR_JOB_RETENTION_SECS", "3600"),
        ]))
        .unwrap();

        assert_eq!(cfg.listen_addr.port(), 9000);
        assert_eq!(cfg.media_dir, PathBuf::from("/srv/media"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.job_retention, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup(&[("ISOLATOR_LISTEN_ADDR", "nope")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ISOLATOR_POLL_INTERVAL_MS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("ISOLATOR_MAX_UPLOAD_MB", "lots")])).is_err());
    }

    #[test]
    fn test_oversized_upload_limit_is_rejected() {
        let huge = usize::MAX.to_string();
        match AppConfig::from_lookup(lookup(&[("ISOLATOR_MAX_UPLOAD_MB", huge.as_str())])) {
            Err(AppError::InvalidInput(message)) => assert!(message.contains("too large")),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("ISOLATOR_SEPARATOR_BIN", "  ")])).unwrap();
        assert_eq!(cfg.separator_bin, "demucs");
    }
}
