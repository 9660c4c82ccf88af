//! Local media file models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of media a local file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A local media file handed to an analysis stage.
///
/// The caller-supplied video is never deleted by the pipeline; the extracted
/// audio is owned by the pipeline and removed at the end of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    path: PathBuf,
    kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn audio(path: impl Into<PathBuf>) -> Self {
        Self::new(path, MediaKind::Audio)
    }

    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self::new(path, MediaKind::Video)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// File name without its extension, used to derive temp artifact names.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string())
    }
}

impl fmt::Display for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.kind)
    }
}
