/// Job lifecycle module
///
/// Tracks every submitted isolation job from upload to final artifact:
/// - Domain: job entities, status, and the repository trait (the job store)
/// - Infrastructure: DashMap-backed in-memory repository
/// - Scheduler: registers jobs and runs the pipeline in the background
/// - Progress stream: polls the store and feeds snapshots to subscribers
/// - Reaper: optional cleanup of old finished jobs
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod progress_stream;
pub mod reaper;
pub mod scheduler;

// Re-exports for easy access
pub use domain::{
    entities::{JobRecord, JobSnapshot, NewJob},
    repository::{JobRepository, JobStatistics},
    value_objects::JobStatus,
};
pub use infrastructure::InMemoryJobRepository;
pub use progress_stream::progress_stream;
pub use reaper::spawn_reaper;
pub use scheduler::JobScheduler;
