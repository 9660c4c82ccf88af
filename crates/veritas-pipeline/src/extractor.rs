//! Audio track extraction into a guarded temporary file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use veritas_media::{Demuxer, MediaError, MediaResult, TempArtifact};
use veritas_models::MediaFile;

/// Pulls the audio track out of a video into a [`TempArtifact`].
#[derive(Clone)]
pub struct AudioExtractor {
    demuxer: Arc<dyn Demuxer>,
    work_dir: PathBuf,
    extension: String,
}

impl AudioExtractor {
    pub fn new(demuxer: Arc<dyn Demuxer>, work_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            demuxer,
            work_dir: work_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Temp path for the audio extracted from `video`.
    pub fn temp_audio_path(&self, video: &MediaFile) -> PathBuf {
        self.work_dir
            .join(format!("temp_audio_for_{}.{}", video.stem(), self.extension))
    }

    /// Extract the audio track of `video`.
    ///
    /// Fails with [`MediaError::NoAudioTrack`] when the container has no
    /// audio stream. A partially written file is removed on failure.
    pub async fn extract(&self, video: &MediaFile) -> MediaResult<TempArtifact> {
        info!("Extracting audio from {}...", video.path().display());

        tokio::fs::create_dir_all(&self.work_dir).await?;

        let info = self.demuxer.probe(video.path()).await?;
        if !info.has_audio() {
            return Err(MediaError::no_audio_track(video.path()));
        }

        let artifact = TempArtifact::new(self.temp_audio_path(video));
        self.demuxer
            .write_audio(video.path(), artifact.path())
            .await?;

        info!("Audio extracted successfully to {}", artifact.path().display());
        Ok(artifact)
    }
}
