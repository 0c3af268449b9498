/// Isolation mode value object
///
/// Selects which derived artifact a job produces. Unrecognized input falls
/// back to `InstrumentalOnly`.
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationMode {
    VocalsOnly,
    #[default]
    InstrumentalOnly,
    VideoNoMusic,
    VideoNoVocals,
}

/// Which of the two separated stems to deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemKind {
    /// The isolated vocal track
    Vocals,
    /// Everything except the vocal track
    NoVocals,
}

impl StemKind {
    /// File stem the separator writes for this kind
    pub fn file_name(&self) -> &'static str {
        match self {
            StemKind::Vocals => "vocals.wav",
            StemKind::NoVocals => "no_vocals.wav",
        }
    }
}

impl std::fmt::Display for StemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StemKind::Vocals => write!(f, "vocals"),
            StemKind::NoVocals => write!(f, "no_vocals"),
        }
    }
}

impl IsolationMode {
    /// Lenient parse used for form input; anything unknown is the default
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Deterministic stem selection
    ///
    /// `VideoNoMusic` keeps the vocal stem: the video keeps its speech and
    /// loses the music bed.
    pub fn selected_stem(&self) -> StemKind {
        match self {
            IsolationMode::VocalsOnly | IsolationMode::VideoNoMusic => StemKind::Vocals,
            IsolationMode::InstrumentalOnly | IsolationMode::VideoNoVocals => StemKind::NoVocals,
        }
    }

    /// Modes whose result is remuxed against the source video stream
    pub fn is_video_variant(&self) -> bool {
        matches!(
            self,
            IsolationMode::VideoNoMusic | IsolationMode::VideoNoVocals
        )
    }
}

impl std::fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IsolationMode::VocalsOnly => write!(f, "vocals_only"),
            IsolationMode::InstrumentalOnly => write!(f, "instrumental_only"),
            IsolationMode::VideoNoMusic => write!(f, "video_no_music"),
            IsolationMode::VideoNoVocals => write!(f, "video_no_vocals"),
        }
    }
}

impl std::str::FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vocals_only" => Ok(IsolationMode::VocalsOnly),
            "instrumental_only" => Ok(IsolationMode::InstrumentalOnly),
            "video_no_music" => Ok(IsolationMode::VideoNoMusic),
            "video_no_vocals" => Ok(IsolationMode::VideoNoVocals),
            _ => Err(format!("Invalid isolation mode: {}", s)),
        }
    }
}

/// Container extensions treated as video input
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Video detection is by file extension only, case-insensitive
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
