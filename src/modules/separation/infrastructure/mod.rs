pub mod process_monitor;
pub mod separator;
pub mod transcoder;

pub use process_monitor::{ExternalProcessMonitor, ProgressCallback, ProgressTracker};
pub use separator::{DemucsSeparator, SeparatedStems, Separator};
pub use transcoder::{FfmpegTranscoder, Transcoder};
