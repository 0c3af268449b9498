/// Stem separation module
///
/// Turns an uploaded audio or video file into a single derived artifact by
/// driving two external tools: a stem separator and a transcoder.
///
/// Architecture:
/// - Domain: progress scaling, isolation modes, stages, errors
/// - Infrastructure: process monitor plus the separator/transcoder seams
/// - Application: the ordered processing pipeline
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use application::{PipelineRequest, ProcessingPipeline};
pub use domain::{
    scale_progress, IsolationMode, ProcessingError, ProcessingStage, ProgressWindow, StemKind,
};
pub use infrastructure::{
    DemucsSeparator, ExternalProcessMonitor, FfmpegTranscoder, ProgressCallback, SeparatedStems,
    Separator, Transcoder,
};
