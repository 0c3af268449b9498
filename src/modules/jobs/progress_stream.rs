/// Progress stream
///
/// A lazy, per-subscriber feed of one job's snapshots. The store is polled at
/// a fixed interval; a snapshot is emitted whenever the observed progress
/// changes, and once more when the job first shows a terminal status (so a
/// failure at an unchanged percentage still reaches the subscriber). The
/// stream ends right after the terminal snapshot.
use crate::modules::jobs::domain::entities::{JobRecord, JobSnapshot};
use crate::modules::jobs::domain::repository::JobRepository;
use crate::modules::jobs::domain::value_objects::JobStatus;
use crate::shared::errors::AppError;
use crate::log_warn;
use futures::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct PollState {
    repository: Arc<dyn JobRepository>,
    raw_id: String,
    job_id: Option<Uuid>,
    interval: Duration,
    last_progress: Option<u8>,
    last_status: Option<JobStatus>,
    polled_once: bool,
    finished: bool,
}

enum Observation {
    Found(JobRecord),
    Missing,
    Failed(AppError),
}

impl PollState {
    async fn observe(&self) -> Observation {
        let Some(job_id) = self.job_id else {
            return Observation::Missing;
        };
        match self.repository.get_by_id(job_id).await {
            Ok(Some(record)) => Observation::Found(record),
            Ok(None) => Observation::Missing,
            Err(e) => Observation::Failed(e),
        }
    }

    /// Whether `record` is worth emitting given what was emitted before
    fn should_emit(&self, record: &JobRecord) -> bool {
        let progressed = self.last_progress != Some(record.progress);
        let newly_terminal = record.is_terminal() && self.last_status != Some(record.status);
        progressed || newly_terminal
    }
}

/// Snapshot stream for `job_id`, polling the store every `interval`
///
/// Unknown or malformed identifiers yield a single error snapshot.
pub fn progress_stream(
    repository: Arc<dyn JobRepository>,
    job_id: &str,
    interval: Duration,
) -> impl Stream<Item = JobSnapshot> + Send + 'static {
    let state = PollState {
        repository,
        raw_id: job_id.to_string(),
        job_id: Uuid::parse_str(job_id).ok(),
        interval,
        last_progress: None,
        last_status: None,
        polled_once: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            if state.polled_once {
                tokio::time::sleep(state.interval).await;
            }
            state.polled_once = true;

            match state.observe().await {
                Observation::Found(record) => {
                    if !state.should_emit(&record) {
                        continue;
                    }
                    state.last_progress = Some(record.progress);
                    state.last_status = Some(record.status);
                    state.finished = record.is_terminal();
                    return Some((record.snapshot(), state));
                }
                Observation::Missing => {
                    state.finished = true;
                    let snapshot = JobSnapshot::not_found(&state.raw_id);
                    return Some((snapshot, state));
                }
                Observation::Failed(e) => {
                    log_warn!("Progress stream for {} aborted: {}", state.raw_id, e);
                    state.finished = true;
                    let snapshot = JobSnapshot::failure(&state.raw_id, &e.to_string());
                    return Some((snapshot, state));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::infrastructure::InMemoryJobRepository;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_malformed_id_yields_single_not_found() {
        let repo: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
        let snapshots: Vec<JobSnapshot> =
            progress_stream(repo, "not-a-uuid", Duration::from_millis(5))
                .collect()
                .await;

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].status, JobStatus::Error);
        assert_eq!(snapshots[0].message, "Job not found");
        assert_eq!(snapshots[0].job_id, "not-a-uuid");
    }
}
