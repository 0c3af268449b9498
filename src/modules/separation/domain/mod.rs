pub mod errors;
pub mod mode;
pub mod progress;
pub mod stage;

pub use errors::ProcessingError;
pub use mode::{is_video_file, IsolationMode, StemKind};
pub use progress::{scale_progress, ProgressWindow};
pub use stage::ProcessingStage;
