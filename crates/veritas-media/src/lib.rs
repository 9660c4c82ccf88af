//! FFmpeg CLI wrapper for audio track extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with quiet output
//! - FFprobe stream inspection (does the container carry audio?)
//! - The [`Demuxer`] capability used by the pipeline, with an FFmpeg backend
//! - [`TempArtifact`], a guard that removes a temporary file on every exit path

pub mod command;
pub mod demux;
pub mod error;
pub mod probe;
pub mod temp;

pub use command::{audio_codec_args, check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use demux::{Demuxer, FfmpegDemuxer};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_container, AudioStreamInfo, ContainerInfo};
pub use temp::TempArtifact;
