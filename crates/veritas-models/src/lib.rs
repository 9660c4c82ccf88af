//! Shared data models for the veritas cue-analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Local media files handed to the pipeline
//! - Remote file handles and their processing state
//! - Per-modality cue analyses and the synthesized final score

pub mod analysis;
pub mod media;
pub mod remote_file;

// Re-export common types
pub use analysis::{format_score, CueAnalysisResult, FinalScoreResult};
pub use media::{MediaFile, MediaKind};
pub use remote_file::{FileState, RemoteFileHandle};
