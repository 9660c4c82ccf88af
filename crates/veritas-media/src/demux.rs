//! Media demuxing capability.

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::command::{audio_codec_args, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_container, ContainerInfo};

/// Opens media containers and pulls their audio track out.
///
/// The pipeline only depends on this trait, so tests can substitute an
/// in-memory implementation for FFmpeg.
#[async_trait]
pub trait Demuxer: Send + Sync {
    /// Inspect the streams of `input`.
    async fn probe(&self, input: &Path) -> MediaResult<ContainerInfo>;

    /// Write the first audio stream of `input` to `output`.
    ///
    /// The output container and codec follow the extension of `output`.
    async fn write_audio(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// [`Demuxer`] backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegDemuxer {
    timeout_secs: Option<u64>,
}

impl FfmpegDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill FFmpeg if extraction takes longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl Demuxer for FfmpegDemuxer {
    async fn probe(&self, input: &Path) -> MediaResult<ContainerInfo> {
        probe_container(input).await
    }

    async fn write_audio(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let extension = output
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| MediaError::UnsupportedFormat(output.display().to_string()))?;

        let cmd = FfmpegCommand::new(input, output)
            .input_arg("-nostdin")
            .no_video()
            .output_args(audio_codec_args(extension)?);

        debug!(
            "Extracting audio track {} -> {}",
            input.display(),
            output.display()
        );

        let runner = match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };
        runner.run(&cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_audio_rejects_extensionless_output() {
        let demuxer = FfmpegDemuxer::new();
        let result = demuxer
            .write_audio(Path::new("in.mp4"), Path::new("audio_out"))
            .await;
        assert!(matches!(result, Err(MediaError::UnsupportedFormat(_))));
    }
}
