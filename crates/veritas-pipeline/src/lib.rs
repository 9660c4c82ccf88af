//! Multi-modal deception-cue analysis pipeline.
//!
//! This crate provides:
//! - Remote file ingestion with bounded retry and state polling
//! - Tolerant decoding of model output
//! - Audio and video cue analysis, and the final score synthesis
//! - The run controller, with guaranteed temp audio cleanup
//! - Report rendering

pub mod analyzer;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod synthesizer;
pub mod uploader;

pub use analyzer::{CueAnalyzer, CueModality};
pub use config::{PipelineConfig, UploadPolicy};
pub use error::{AnalysisError, PipelineError, PipelineResult, SynthesisError, UploadError};
pub use extractor::AudioExtractor;
pub use logging::RunLogger;
pub use parser::{parse_structured, strip_code_fence, ParseError};
pub use pipeline::{PipelineController, PipelineReport, PipelineStage, StageFailure};
pub use report::render;
pub use synthesizer::{build_prompt, ScoreSynthesizer};
pub use uploader::Uploader;
