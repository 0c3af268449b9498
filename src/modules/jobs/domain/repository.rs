/// Repository trait for job state (the job store)
///
/// One writer per job (its scheduler task) and any number of readers.
/// Every method replaces or reads a whole entry atomically.
use crate::modules::jobs::domain::entities::{JobRecord, NewJob};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Register a new job in `processing` state at 0%
    async fn create(&self, job: NewJob) -> AppResult<JobRecord>;

    /// Get job by ID
    async fn get_by_id(&self, job_id: Uuid) -> AppResult<Option<JobRecord>>;

    /// Record pipeline progress (monotonic, ignored once terminal)
    async fn update_progress(&self, job_id: Uuid, percent: u8, message: &str) -> AppResult<()>;

    /// Mark job as complete with the artifact location
    async fn mark_completed(&self, job_id: Uuid, output: &str) -> AppResult<()>;

    /// Mark job as failed with error message
    async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()>;

    /// Delete terminal jobs last updated before `cutoff` (cleanup)
    async fn delete_finished_before(&self, cutoff: DateTime<Utc>) -> AppResult<usize>;

    /// Get job statistics
    async fn get_statistics(&self) -> AppResult<JobStatistics>;
}

/// Job store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatistics {
    pub processing_count: usize,
    pub complete_count: usize,
    pub error_count: usize,
    pub total_count: usize,
}
