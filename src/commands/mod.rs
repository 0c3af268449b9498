/// HTTP surface: shared handler state and the route registry
pub mod registry;

pub use registry::build_router;

use crate::modules::jobs::{InMemoryJobRepository, JobRepository, JobScheduler};
use crate::modules::media::MediaStorage;
use crate::modules::separation::{
    DemucsSeparator, FfmpegTranscoder, ProcessingPipeline, Separator, Transcoder,
};
use crate::shared::AppConfig;
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<JobScheduler>,
    pub jobs: Arc<dyn JobRepository>,
    pub storage: Arc<MediaStorage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the production services from configuration
    pub fn from_config(config: AppConfig) -> Self {
        let separator: Arc<dyn Separator> = Arc::new(DemucsSeparator::new(
            config.separator_bin.clone(),
            config.separator_model.clone(),
        ));
        let transcoder: Arc<dyn Transcoder> =
            Arc::new(FfmpegTranscoder::new(config.transcoder_bin.clone()));

        Self::with_services(config, separator, transcoder)
    }

    /// Wire the state around arbitrary separator and transcoder implementations
    pub fn with_services(
        config: AppConfig,
        separator: Arc<dyn Separator>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let jobs: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
        let storage = Arc::new(MediaStorage::new(
            config.media_dir.clone(),
            config.scratch_dir.clone(),
        ));
        let pipeline = Arc::new(ProcessingPipeline::new(separator, transcoder));
        let scheduler = Arc::new(JobScheduler::new(
            Arc::clone(&jobs),
            pipeline,
            Arc::clone(&storage),
        ));

        Self {
            scheduler,
            jobs,
            storage,
            config: Arc::new(config),
        }
    }
}
