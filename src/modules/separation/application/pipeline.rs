/// Processing pipeline
///
/// Drives one job through its ordered stages:
///
/// 1. Init (0-5%): create the output directory
/// 2. Extraction (5-20%): video input only, demux the audio track
/// 3. Separation (20-75%): run the separator, progress mapped into 25-75%
/// 4. Selection (75-80%): pick the stem the mode asks for
/// 5. Finalize (80-100%): remux against the source video, or copy as WAV
///
/// The whole run is blocking and is meant to execute on a worker thread.
use crate::modules::separation::domain::stage::checkpoints;
use crate::modules::separation::domain::{is_video_file, IsolationMode, ProcessingError};
use crate::modules::separation::infrastructure::{ProgressCallback, Separator, Transcoder};
use crate::shared::utils::TimedOperation;
use crate::{log_debug, log_info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EXTRACTED_AUDIO_FILE: &str = "extracted_audio.wav";
const AUDIO_OUTPUT_FILE: &str = "output.wav";

/// Everything the pipeline needs to know about one job
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub mode: IsolationMode,
}

impl PipelineRequest {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, mode: IsolationMode) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            mode,
        }
    }

    pub fn is_video(&self) -> bool {
        is_video_file(&self.input)
    }

    /// Whether the final artifact is a remuxed video rather than plain audio
    pub fn produces_video(&self) -> bool {
        self.is_video() && self.mode.is_video_variant()
    }

    /// Path of the final artifact inside the output directory
    pub fn final_output_path(&self) -> PathBuf {
        if self.produces_video() {
            let ext = self
                .input
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            self.output_dir.join(format!("output.{}", ext))
        } else {
            self.output_dir.join(AUDIO_OUTPUT_FILE)
        }
    }
}

pub struct ProcessingPipeline {
    separator: Arc<dyn Separator>,
    transcoder: Arc<dyn Transcoder>,
}

impl ProcessingPipeline {
    pub fn new(separator: Arc<dyn Separator>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            separator,
            transcoder,
        }
    }

    /// Run every stage and return the path of the final artifact
    ///
    /// Any failure aborts the run; nothing is reported as the result.
    pub fn run(
        &self,
        request: &PipelineRequest,
        progress: ProgressCallback,
    ) -> Result<PathBuf, ProcessingError> {
        let timer = TimedOperation::new(&format!("pipeline {}", request.input.display()));
        let report = |percent: u8, message: &str| progress(percent, message.to_string());

        // Init
        std::fs::create_dir_all(&request.output_dir).map_err(|source| ProcessingError::Init {
            path: request.output_dir.clone(),
            source,
        })?;
        report(checkpoints::STARTED, "Starting processing...");

        // Extraction
        let audio_path = self.extract(request, &report)?;

        // Separation
        report(
            checkpoints::SEPARATING,
            "Separating audio stems (this may take a while)...",
        );
        let stems = self
            .separator
            .separate(
                &audio_path,
                &request.output_dir,
                checkpoints::SEPARATOR_WINDOW,
                progress.clone(),
            )
            .map_err(ProcessingError::SeparationFailed)?;
        report(checkpoints::SEPARATED, "Stem separation complete");

        // Selection
        let kind = request.mode.selected_stem();
        let selected = stems.path(kind).to_path_buf();
        if !selected.is_file() {
            return Err(ProcessingError::MissingStem(selected));
        }
        log_debug!("Mode {} selected {} stem", request.mode, kind);
        report(checkpoints::SELECTED, &format!("Selected {} stem", kind));

        // Finalize
        let final_output = self.finalize(request, &selected, &report)?;
        report(checkpoints::FINISHED, "Processing finished!");

        timer.finish_with_info(&request.mode.to_string());
        log_info!("Pipeline produced {}", final_output.display());
        Ok(final_output)
    }

    fn extract(
        &self,
        request: &PipelineRequest,
        report: &dyn Fn(u8, &str),
    ) -> Result<PathBuf, ProcessingError> {
        if !request.is_video() {
            report(checkpoints::AUDIO_DETECTED, "Audio file detected");
            return Ok(request.input.clone());
        }

        report(checkpoints::EXTRACTING, "Extracting audio from video...");
        let audio_path = request.output_dir.join(EXTRACTED_AUDIO_FILE);
        self.transcoder
            .extract_audio(&request.input, &audio_path)
            .map_err(ProcessingError::ExtractionFailed)?;
        report(checkpoints::EXTRACTED, "Audio extraction complete");

        Ok(audio_path)
    }

    fn finalize(
        &self,
        request: &PipelineRequest,
        selected: &Path,
        report: &dyn Fn(u8, &str),
    ) -> Result<PathBuf, ProcessingError> {
        let final_output = request.final_output_path();

        if request.produces_video() {
            report(checkpoints::MERGING, "Merging audio back into video...");
            self.transcoder
                .merge(&request.input, selected, &final_output)
                .map_err(ProcessingError::RemuxFailed)?;
            report(checkpoints::FINALIZED, "Video processing complete");
        } else {
            report(checkpoints::COPYING, "Finalizing audio file...");
            std::fs::copy(selected, &final_output).map_err(|source| ProcessingError::Finalize {
                path: final_output.clone(),
                source,
            })?;
            report(checkpoints::FINALIZED, "Audio processing complete");
        }

        Ok(final_output)
    }
}
