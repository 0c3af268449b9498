/// In-memory implementation of JobRepository
///
/// Backed by a `DashMap`: each entry is locked for the duration of a single
/// read or update, so readers never observe a half-written record. Records
/// do not survive a restart.
use crate::modules::jobs::domain::entities::{JobRecord, NewJob};
use crate::modules::jobs::domain::repository::{JobRepository, JobStatistics};
use crate::modules::jobs::domain::value_objects::JobStatus;
use crate::shared::errors::{AppError, AppResult};
use crate::{log_debug, log_warn};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<DashMap<Uuid, JobRecord>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Run `update` against one entry while holding its shard lock
    fn with_job<F>(&self, job_id: Uuid, update: F) -> AppResult<bool>
    where
        F: FnOnce(&mut JobRecord) -> bool,
    {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| AppError::job_not_found(job_id))?;
        Ok(update(entry.value_mut()))
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: NewJob) -> AppResult<JobRecord> {
        match self.jobs.entry(job.id) {
            Entry::Occupied(_) => Err(AppError::InvalidInput(format!(
                "Job {} already exists",
                job.id
            ))),
            Entry::Vacant(slot) => {
                let record = JobRecord::new(job);
                slot.insert(record.clone());
                log_debug!("Registered job {}", record.id);
                Ok(record)
            }
        }
    }

    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>> {
        Ok(self.jobs.get(&job_id).map(|entry| entry.value().clone()))
    }

    async fn update_progress(&self, job_id: Uuid, percent: u8, message: &str) -> AppResult<()> {
        let applied = self.with_job(job_id, |job| job.apply_progress(percent, message))?;
        if !applied {
            log_debug!("Ignored progress {}% for finished job {}", percent, job_id);
        }
        Ok(())
    }

    async fn mark_completed(&self, job_id: Uuid, output: &str) -> AppResult<()> {
        let applied = self.with_job(job_id, |job| job.complete(output.to_string()))?;
        if !applied {
            log_warn!("Job {} already finished; completion ignored", job_id);
        }
        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        let applied = self.with_job(job_id, |job| job.fail(error))?;
        if !applied {
            log_warn!("Job {} already finished; failure ignored", job_id);
        }
        Ok(())
    }

    async fn delete_finished_before(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let before = self.jobs.len();
        self.jobs
            .retain(|_, job| !(job.is_terminal() && job.updated_at < cutoff));
        Ok(before.saturating_sub(self.jobs.len()))
    }

    async fn get_statistics(&self) -> AppResult<JobStatistics> {
        let mut stats = JobStatistics::default();
        for entry in self.jobs.iter() {
            match entry.value().status {
                JobStatus::Processing => stats.processing_count += 1,
                JobStatus::Complete => stats.complete_count += 1,
                JobStatus::Error => stats.error_count += 1,
            }
            stats.total_count += 1;
        }
        Ok(stats)
    }
}
