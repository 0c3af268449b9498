/// Test helper functions and service builders
use isolator_lib::commands::AppState;
use isolator_lib::modules::jobs::{JobRecord, JobRepository};
use isolator_lib::modules::separation::{Separator, Transcoder};
use isolator_lib::shared::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

/// Application state backed by temporary directories
pub struct TestApp {
    pub state: AppState,
    pub media_dir: TempDir,
    pub scratch_dir: TempDir,
}

impl TestApp {
    pub fn jobs(&self) -> Arc<dyn JobRepository> {
        self.state.jobs.clone()
    }

    /// Number of files left in the scratch directory
    pub fn scratch_file_count(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn test_config(media_dir: &TempDir, scratch_dir: &TempDir) -> AppConfig {
    AppConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        media_dir: media_dir.path().to_path_buf(),
        scratch_dir: scratch_dir.path().to_path_buf(),
        poll_interval: Duration::from_millis(10),
        ..AppConfig::default()
    }
}

/// Build the full service graph around the given tool doubles
pub fn build_test_app(separator: Arc<dyn Separator>, transcoder: Arc<dyn Transcoder>) -> TestApp {
    let media_dir = TempDir::new().unwrap();
    let scratch_dir = TempDir::new().unwrap();
    let state = AppState::with_services(
        test_config(&media_dir, &scratch_dir),
        separator,
        transcoder,
    );

    TestApp {
        state,
        media_dir,
        scratch_dir,
    }
}

/// Poll the store until the job is terminal or `timeout` elapses
pub async fn wait_for_terminal(
    repo: &dyn JobRepository,
    job_id: Uuid,
    timeout: Duration,
) -> JobRecord {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let record = repo
            .get_by_id(job_id)
            .await
            .unwrap()
            .expect("job should exist");
        if record.is_terminal() {
            return record;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {} did not finish in time (last: {}%)",
            job_id,
            record.progress
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

static TOOL_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Serialize tests that write and then execute tool scripts
///
/// A script still open for writing in one test can be inherited by a child
/// forked in another, which makes its exec fail with "text file busy".
pub fn acquire_tool_lock() -> std::sync::MutexGuard<'static, ()> {
    TOOL_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write a `sh` script standing in for an external tool
#[cfg(unix)]
pub fn write_tool_script(dir: &TempDir, name: &str, body: &str, executable: bool) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mode = if executable { 0o755 } else { 0o644 };
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    path
}
