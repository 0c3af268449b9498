/// Ordered pipeline stages and the progress checkpoints reported between them
use super::progress::ProgressWindow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Init,
    Extraction,
    Separation,
    Selection,
    Finalize,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Init => write!(f, "init"),
            ProcessingStage::Extraction => write!(f, "extraction"),
            ProcessingStage::Separation => write!(f, "separation"),
            ProcessingStage::Selection => write!(f, "selection"),
            ProcessingStage::Finalize => write!(f, "finalize"),
        }
    }
}

/// Fixed checkpoints reported between tool runs
pub mod checkpoints {
    use super::ProgressWindow;

    pub const STARTED: u8 = 5;
    pub const EXTRACTING: u8 = 10;
    pub const AUDIO_DETECTED: u8 = 15;
    pub const EXTRACTED: u8 = 20;
    pub const SEPARATING: u8 = 25;
    pub const SEPARATED: u8 = 75;
    /// Slice of the job scale the separator's own percentage is mapped into
    pub const SEPARATOR_WINDOW: ProgressWindow = ProgressWindow::new(SEPARATING, SEPARATED);
    pub const SELECTED: u8 = 78;
    pub const MERGING: u8 = 80;
    pub const COPYING: u8 = 85;
    pub const FINALIZED: u8 = 95;
    pub const FINISHED: u8 = 100;
}
