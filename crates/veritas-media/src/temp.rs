//! Temporary file ownership.

use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// Owns a temporary file at a fixed path and removes it when dropped.
///
/// [`TempArtifact::remove`] is the normal, logged removal path. Dropping the
/// artifact (early return, error, panic) deletes the file silently.
#[derive(Debug)]
pub struct TempArtifact {
    path: TempPath,
}

impl TempArtifact {
    /// Take ownership of `path`. The file does not need to exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: TempPath::from_path(path.as_ref()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file. Returns whether a file was actually deleted.
    pub fn remove(self) -> MediaResult<bool> {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => {
                debug!("Removed temporary file {}", shown);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!(
                    "Failed to remove temporary file {}: {}. You may need to delete it manually.",
                    shown, e
                );
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp_audio_for_a.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let artifact = TempArtifact::new(&path);
        assert!(artifact.remove().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let artifact = TempArtifact::new(dir.path().join("never_written.mp3"));
        assert!(!artifact.remove().unwrap());
    }

    #[test]
    fn test_drop_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp_audio_for_b.mp3");
        std::fs::write(&path, b"audio").unwrap();

        {
            let _artifact = TempArtifact::new(&path);
        }

        assert!(!path.exists(), "Drop should remove the artifact");
    }

    #[test]
    fn test_drop_of_unwritten_path_is_silent() {
        let dir = TempDir::new().unwrap();
        drop(TempArtifact::new(dir.path().join("never_written.mp3")));
    }

    #[test]
    fn test_drop_runs_during_panic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("temp_audio_for_c.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let guarded = path.clone();
        let result = std::panic::catch_unwind(move || {
            let _artifact = TempArtifact::new(guarded);
            panic!("stage blew up");
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
