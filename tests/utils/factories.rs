/// Test doubles and data factories
///
/// The fakes stand in for the external tools: they write small marker files
/// where the real tools would write audio, so tests can tell stems apart.
use isolator_lib::modules::jobs::NewJob;
use isolator_lib::modules::separation::{
    IsolationMode, ProgressCallback, ProgressWindow, SeparatedStems, Separator, Transcoder,
};
use isolator_lib::shared::ToolError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

pub const VOCALS_BYTES: &[u8] = b"VOCALS";
pub const NO_VOCALS_BYTES: &[u8] = b"NO_VOCALS";
pub const EXTRACTED_BYTES: &[u8] = b"EXTRACTED";

/// Separator that reports scripted progress and writes marker stems
pub struct FakeSeparator {
    model: String,
    steps: Vec<u32>,
    exit_code: Option<i32>,
}

impl Default for FakeSeparator {
    fn default() -> Self {
        Self {
            model: "htdemucs".to_string(),
            steps: vec![10, 55, 100],
            exit_code: None,
        }
    }
}

impl FakeSeparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress and then exit with `code`
    pub fn failing(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn with_steps(mut self, steps: Vec<u32>) -> Self {
        self.steps = steps;
        self
    }
}

impl Separator for FakeSeparator {
    fn separate(
        &self,
        audio: &Path,
        output_dir: &Path,
        window: ProgressWindow,
        progress: ProgressCallback,
    ) -> Result<SeparatedStems, ToolError> {
        for step in &self.steps {
            progress(window.scale(*step), format!("Processing audio stems... {}%", step));
        }

        if let Some(code) = self.exit_code {
            return Err(ToolError::Failure {
                tool: "demucs".to_string(),
                exit_code: Some(code),
            });
        }

        let stems = SeparatedStems::expected(output_dir, &self.model, audio);
        write_marker(&stems.vocals, VOCALS_BYTES)?;
        write_marker(&stems.no_vocals, NO_VOCALS_BYTES)?;
        Ok(stems)
    }
}

/// Transcoder that fakes demux/remux with file concatenation
///
/// `merge` writes the video file's bytes followed by the audio file's bytes,
/// so the video part of the result can be compared byte for byte.
#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: Mutex<Vec<String>>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transcoder for FakeTranscoder {
    fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(format!("extract {}", input.display()));
        write_marker(output, EXTRACTED_BYTES)
    }

    fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError> {
        self.calls.lock().unwrap().push(format!("merge {}", output.display()));
        let mut merged = std::fs::read(video).map_err(|e| ToolError::from_io("ffmpeg", e))?;
        merged.extend(std::fs::read(audio).map_err(|e| ToolError::from_io("ffmpeg", e))?);
        write_marker(output, &merged)
    }
}

fn write_marker(path: &Path, bytes: &[u8]) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ToolError::from_io("fake", e))?;
    }
    std::fs::write(path, bytes).map_err(|e| ToolError::from_io("fake", e))
}

/// Builder for `NewJob` values
pub struct NewJobFactory {
    id: Uuid,
    source_path: PathBuf,
    output_dir: PathBuf,
    mode: IsolationMode,
}

impl Default for NewJobFactory {
    fn default() -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            source_path: PathBuf::from("/tmp/upload-test.wav"),
            output_dir: PathBuf::from("/media").join(id.to_string()),
            mode: IsolationMode::InstrumentalOnly,
        }
    }
}

impl NewJobFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn mode(mut self, mode: IsolationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    pub fn build(self) -> NewJob {
        NewJob {
            id: self.id,
            source_path: self.source_path,
            output_dir: self.output_dir,
            mode: self.mode,
        }
    }
}
