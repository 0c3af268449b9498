/// Job scheduler
///
/// Accepts uploads, registers a job for each, and runs the processing
/// pipeline in the background. The pipeline itself blocks on subprocess I/O,
/// so it runs on tokio's blocking pool; its progress callback only pushes
/// onto a channel, and the job's own async task drains that channel into the
/// store. That task is the single writer for the job's record.
use crate::modules::jobs::domain::entities::NewJob;
use crate::modules::jobs::domain::repository::JobRepository;
use crate::modules::media::MediaStorage;
use crate::modules::separation::{
    IsolationMode, PipelineRequest, ProcessingPipeline, ProgressCallback,
};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{LogContext, TimedOperation};
use crate::{log_error, log_warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub struct JobScheduler {
    job_repository: Arc<dyn JobRepository>,
    pipeline: Arc<ProcessingPipeline>,
    storage: Arc<MediaStorage>,
}

impl JobScheduler {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        pipeline: Arc<ProcessingPipeline>,
        storage: Arc<MediaStorage>,
    ) -> Self {
        Self {
            job_repository,
            pipeline,
            storage,
        }
    }

    /// Accept a new job and return its identifier immediately
    ///
    /// Only storage failures are reported here; everything that goes wrong
    /// during processing surfaces through the job's status.
    pub async fn submit<B>(&self, file_bytes: B, file_name: &str, mode: IsolationMode) -> AppResult<Uuid>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        self.submit_tracked(file_bytes, file_name, mode)
            .await
            .map(|(job_id, _)| job_id)
    }

    /// Same as `submit`, also handing back the background task
    pub async fn submit_tracked<B>(
        &self,
        file_bytes: B,
        file_name: &str,
        mode: IsolationMode,
    ) -> AppResult<(Uuid, JoinHandle<()>)>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let job_id = Uuid::new_v4();
        let source_path = self.storage.save_upload(file_name, file_bytes).await?;

        let registered = async {
            let output_dir = self.storage.create_job_dir(job_id).await?;
            self.job_repository
                .create(NewJob {
                    id: job_id,
                    source_path: source_path.clone(),
                    output_dir,
                    mode,
                })
                .await
        }
        .await;

        let record = match registered {
            Ok(record) => record,
            Err(e) => {
                self.storage.remove_scratch(&source_path).await;
                return Err(e);
            }
        };

        LogContext::job_transition(
            &job_id.to_string(),
            "processing",
            &format!("'{}' as {}", file_name, mode),
        );

        let task = JobTask {
            job_id,
            request: PipelineRequest::new(record.source_path, record.output_dir, record.mode),
            job_repository: Arc::clone(&self.job_repository),
            pipeline: Arc::clone(&self.pipeline),
            storage: Arc::clone(&self.storage),
        };
        let handle = tokio::spawn(task.run());

        Ok((job_id, handle))
    }
}

/// Everything one background job owns
struct JobTask {
    job_id: Uuid,
    request: PipelineRequest,
    job_repository: Arc<dyn JobRepository>,
    pipeline: Arc<ProcessingPipeline>,
    storage: Arc<MediaStorage>,
}

impl JobTask {
    async fn run(self) {
        let timer = TimedOperation::new(&format!("job {}", self.job_id));
        let source_path: PathBuf = self.request.input.clone();

        let (tx, mut rx) = mpsc::unbounded_channel::<(u8, String)>();
        let progress: ProgressCallback = Arc::new(move |percent, message| {
            // Receiver only goes away if the job task itself is gone
            let _ = tx.send((percent, message));
        });

        let pipeline = Arc::clone(&self.pipeline);
        let request = self.request.clone();
        let worker = tokio::task::spawn_blocking(move || pipeline.run(&request, progress));

        // Closes once the worker drops the last sender
        while let Some((percent, message)) = rx.recv().await {
            if let Err(e) = self
                .job_repository
                .update_progress(self.job_id, percent, &message)
                .await
            {
                log_warn!("Job {}: dropped progress update: {}", self.job_id, e);
            }
        }

        let outcome = match worker.await {
            Ok(Ok(artifact)) => self.storage.artifact_url(&artifact),
            Ok(Err(e)) => {
                log_warn!("Job {} failed during {}: {}", self.job_id, e.stage(), e);
                Err(e.into())
            }
            Err(e) => {
                log_error!("Job {} worker crashed: {}", self.job_id, e);
                Err(e.into())
            }
        };

        let recorded = match &outcome {
            Ok(url) => self.job_repository.mark_completed(self.job_id, url).await,
            Err(e) => {
                self.job_repository
                    .mark_failed(self.job_id, &failure_message(e))
                    .await
            }
        };
        if let Err(e) = recorded {
            log_error!("Job {}: could not record outcome: {}", self.job_id, e);
        }

        self.storage.remove_scratch(&source_path).await;

        match outcome {
            Ok(url) => {
                LogContext::job_transition(&self.job_id.to_string(), "complete", &url);
                timer.finish_with_info("complete");
            }
            Err(e) => {
                LogContext::job_transition(&self.job_id.to_string(), "error", &failure_message(&e));
                timer.finish_with_info("error");
            }
        }
    }
}

/// Human-readable job message for a failure
fn failure_message(error: &AppError) -> String {
    match error {
        AppError::ProcessingError(message) => message.clone(),
        other => other.to_string(),
    }
}
