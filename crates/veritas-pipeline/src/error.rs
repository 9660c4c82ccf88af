//! Pipeline error types.
//!
//! Each stage returns its own error enum so that failure paths are visible in
//! the signatures. Stage errors are recoverable: the controller turns them
//! into partial reports. Only [`PipelineError`] ends a run early.

use std::path::PathBuf;

use thiserror::Error;
use veritas_gemini::GeminiError;
use veritas_models::FileState;

use crate::parser::ParseError;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Why a file could not be made ready on the remote service.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Registering {} failed after {attempts} attempt(s): {source}", .path.display())]
    Registration {
        path: PathBuf,
        attempts: u32,
        source: GeminiError,
    },

    #[error("Failed to upload {} after {attempts} attempts: {source}", .path.display())]
    RetriesExhausted {
        path: PathBuf,
        attempts: u32,
        source: GeminiError,
    },

    #[error("File '{name}' finished in state {state}, not ACTIVE")]
    NotActive { name: String, state: FileState },

    #[error("File '{name}' still processing after {polls} state checks")]
    PollTimeout { name: String, polls: u32 },

    #[error("Checking the state of '{name}' failed: {source}")]
    Poll { name: String, source: GeminiError },
}

impl UploadError {
    /// Content or processing failure on the service side, not worth retrying.
    pub fn is_content_failure(&self) -> bool {
        matches!(self, UploadError::NotActive { .. })
    }
}

/// Failure of one cue analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Inference failed: {0}")]
    Inference(#[from] GeminiError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalysisError {
    /// Raw model output, when the failure was a decoding problem.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AnalysisError::Parse(e) => Some(&e.raw),
            _ => None,
        }
    }
}

/// Failure of the final synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Inference failed: {0}")]
    Inference(#[from] GeminiError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SynthesisError {
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            SynthesisError::Parse(e) => Some(&e.raw),
            SynthesisError::Inference(_) => None,
        }
    }
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video file not found at {}", .0.display())]
    InputNotFound(PathBuf),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
