/// Domain entities for the job system
///
/// A job is one uploaded file travelling through the processing pipeline.
/// Its record is the single source of truth for progress queries.
use super::value_objects::JobStatus;
use crate::modules::separation::IsolationMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Highest progress a job may show before it is marked complete
pub const MAX_IN_FLIGHT_PROGRESS: u8 = 99;

pub const INITIAL_MESSAGE: &str = "Starting...";
pub const COMPLETE_MESSAGE: &str = "Complete!";
pub const NOT_FOUND_MESSAGE: &str = "Job not found";

/// New job to be registered (before insertion into the store)
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: Uuid,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub mode: IsolationMode,
}

/// Job record held by the store
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub progress: u8,
    pub message: String,
    pub status: JobStatus,
    /// URL path of the produced artifact; set iff `status == Complete`
    pub output: Option<String>,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub mode: IsolationMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(job: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id: job.id,
            progress: 0,
            message: INITIAL_MESSAGE.to_string(),
            status: JobStatus::Processing,
            output: None,
            source_path: job.source_path,
            output_dir: job.output_dir,
            mode: job.mode,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a progress update from the pipeline
    ///
    /// Ignored once terminal. Progress never decreases and stays below 100
    /// until completion; the message always follows the latest update.
    /// Returns false when the update was ignored.
    pub fn apply_progress(&mut self, percent: u8, message: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        let capped = percent.min(MAX_IN_FLIGHT_PROGRESS);
        if capped > self.progress {
            self.progress = capped;
        }
        self.message = message.to_string();
        self.updated_at = Utc::now();
        true
    }

    /// `processing -> complete`; returns false if already terminal
    pub fn complete(&mut self, output: String) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Complete;
        self.progress = 100;
        self.message = COMPLETE_MESSAGE.to_string();
        self.output = Some(output);
        self.updated_at = Utc::now();
        true
    }

    /// `processing -> error`; returns false if already terminal
    pub fn fail(&mut self, error: &str) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Error;
        self.message = error.to_string();
        self.output = None;
        self.updated_at = Utc::now();
        true
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.id.to_string(),
            progress: self.progress,
            message: self.message.clone(),
            status: self.status,
            output: self.output.clone(),
            mode: Some(self.mode),
            error: None,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Public view of a job, as streamed to progress subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub progress: u8,
    pub message: String,
    pub status: JobStatus,
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<IsolationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// Terminal snapshot describing a failure to observe the job at all
    pub fn failure(job_id: &str, error: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            progress: 0,
            message: error.to_string(),
            status: JobStatus::Error,
            output: None,
            mode: None,
            error: Some(error.to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn not_found(job_id: &str) -> Self {
        Self::failure(job_id, NOT_FOUND_MESSAGE)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
