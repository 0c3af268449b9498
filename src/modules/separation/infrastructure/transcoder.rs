/// Transcoder seam and its FFmpeg-backed implementation
use crate::shared::errors::ToolError;
use crate::shared::utils::LogContext;
use crate::log_warn;
use std::path::Path;
use std::process::{Command, Stdio};

/// Demuxes audio out of a container and muxes a new audio track back in
pub trait Transcoder: Send + Sync {
    /// Write the input's audio track to `output` as 16-bit PCM WAV
    fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), ToolError>;

    /// Copy the first video stream of `video` and pair it with the first
    /// audio stream of `audio`; the container follows `output`'s extension
    fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError>;
}

pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn extract_args(input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    pub fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-i".to_string(),
            audio.to_string_lossy().into_owned(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, args: Vec<String>) -> Result<(), ToolError> {
        LogContext::tool_invocation(&self.program, &args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolError::from_io("ffmpeg", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            log_warn!(
                "ffmpeg failed: {}",
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            );
            return Err(ToolError::Failure {
                tool: "ffmpeg".to_string(),
                exit_code: output.status.code(),
            });
        }

        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Transcoder for FfmpegTranscoder {
    fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(Self::extract_args(input, output))
    }

    fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), ToolError> {
        self.run(Self::merge_args(video, audio, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_drops_video_and_writes_pcm() {
        let args = FfmpegTranscoder::extract_args(Path::new("in.mp4"), Path::new("out.wav"));
        assert_eq!(
            args,
            vec!["-y", "-i", "in.mp4", "-vn", "-acodec", "pcm_s16le", "out.wav"]
        );
    }

    #[test]
    fn test_merge_copies_video_and_replaces_audio() {
        let args = FfmpegTranscoder::merge_args(
            Path::new("in.mp4"),
            Path::new("no_vocals.wav"),
            Path::new("output.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-c:v copy"));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0"));
        assert_eq!(args.last().map(String::as_str), Some("output.mp4"));
    }

    #[test]
    fn test_missing_binary_is_not_found() {
        let transcoder = FfmpegTranscoder::new("definitely-not-an-installed-ffmpeg-7f3a");
        let result = transcoder.extract_audio(Path::new("a.mp4"), Path::new("b.wav"));
        assert!(matches!(result, Err(ToolError::NotFound { .. })));
    }
}
