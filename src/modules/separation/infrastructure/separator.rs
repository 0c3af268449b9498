/// Stem separator seam and its Demucs-backed implementation
use super::process_monitor::{ExternalProcessMonitor, ProgressCallback};
use crate::modules::separation::domain::{ProgressWindow, StemKind};
use crate::shared::errors::ToolError;
use std::path::{Path, PathBuf};

/// Location of the two stems a separation run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatedStems {
    pub vocals: PathBuf,
    pub no_vocals: PathBuf,
}

impl SeparatedStems {
    /// `<output_dir>/<model>/<input basename without extension>/{vocals,no_vocals}.wav`
    pub fn expected(output_dir: &Path, model: &str, audio: &Path) -> Self {
        let track_name = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_string());
        let stem_dir = output_dir.join(model).join(track_name);
        Self {
            vocals: stem_dir.join(StemKind::Vocals.file_name()),
            no_vocals: stem_dir.join(StemKind::NoVocals.file_name()),
        }
    }

    pub fn path(&self, kind: StemKind) -> &Path {
        match kind {
            StemKind::Vocals => &self.vocals,
            StemKind::NoVocals => &self.no_vocals,
        }
    }
}

/// Splits an audio file into a vocal and a residual stem
///
/// Implementations block the calling thread and report progress already
/// mapped into `window`.
pub trait Separator: Send + Sync {
    fn separate(
        &self,
        audio: &Path,
        output_dir: &Path,
        window: ProgressWindow,
        progress: ProgressCallback,
    ) -> Result<SeparatedStems, ToolError>;
}

/// Runs the `demucs` CLI in two-stem mode
pub struct DemucsSeparator {
    program: String,
    model: String,
}

impl DemucsSeparator {
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
        }
    }

    pub fn args(&self, audio: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            "-n".to_string(),
            self.model.clone(),
            "--two-stems".to_string(),
            "vocals".to_string(),
            audio.to_string_lossy().into_owned(),
            "-o".to_string(),
            output_dir.to_string_lossy().into_owned(),
        ]
    }
}

impl Default for DemucsSeparator {
    fn default() -> Self {
        Self::new("demucs", "htdemucs")
    }
}

impl Separator for DemucsSeparator {
    fn separate(
        &self,
        audio: &Path,
        output_dir: &Path,
        window: ProgressWindow,
        progress: ProgressCallback,
    ) -> Result<SeparatedStems, ToolError> {
        ExternalProcessMonitor::new("demucs", self.program.clone(), self.args(audio, output_dir))
            .with_window(window)
            .with_message_prefix("Processing audio stems...")
            .run(progress)?;

        Ok(SeparatedStems::expected(output_dir, &self.model, audio))
    }
}
