/// Background cleanup of finished job records
///
/// Terminal jobs whose last update is older than the retention period are
/// dropped from the store. Artifacts under the media root are left alone.
use crate::modules::jobs::domain::repository::JobRepository;
use crate::{log_debug, log_warn};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound on how long an expired record can linger
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Sweep period for a given retention: a tenth of it, within 1s..=5min
pub fn sweep_interval(retention: Duration) -> Duration {
    (retention / 10).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL)
}

/// Run one sweep and return how many records were removed
pub async fn reap_once(repository: &dyn JobRepository, retention: Duration) -> usize {
    let cutoff = match chrono::Duration::from_std(retention) {
        Ok(age) => Utc::now() - age,
        Err(e) => {
            log_warn!("Job retention {:?} out of range: {}", retention, e);
            return 0;
        }
    };

    match repository.delete_finished_before(cutoff).await {
        Ok(removed) => {
            if removed > 0 {
                log_debug!("Reaped {} finished jobs", removed);
            }
            removed
        }
        Err(e) => {
            log_warn!("Job cleanup failed: {}", e);
            0
        }
    }
}

/// Spawn the periodic cleanup task
pub fn spawn_reaper(repository: Arc<dyn JobRepository>, retention: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval(retention));

        loop {
            interval.tick().await;
            reap_once(repository.as_ref(), retention).await;
        }
    })
}
