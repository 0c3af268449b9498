use super::stage::ProcessingStage;
use crate::shared::errors::{AppError, ToolError};
use std::path::PathBuf;
use thiserror::Error;

/// A pipeline failure, annotated with the stage that raised it
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Could not prepare output directory {}: {source}", .path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(#[source] ToolError),

    #[error("Stem separation failed: {0}")]
    SeparationFailed(#[source] ToolError),

    #[error("Separated stem missing: {}", .0.display())]
    MissingStem(PathBuf),

    #[error("Remux failed: {0}")]
    RemuxFailed(#[source] ToolError),

    #[error("Could not write {}: {source}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessingError {
    pub fn stage(&self) -> ProcessingStage {
        match self {
            ProcessingError::Init { .. } => ProcessingStage::Init,
            ProcessingError::ExtractionFailed(_) => ProcessingStage::Extraction,
            ProcessingError::SeparationFailed(_) => ProcessingStage::Separation,
            ProcessingError::MissingStem(_) => ProcessingStage::Selection,
            ProcessingError::RemuxFailed(_) | ProcessingError::Finalize { .. } => {
                ProcessingStage::Finalize
            }
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        AppError::ProcessingError(err.to_string())
    }
}
