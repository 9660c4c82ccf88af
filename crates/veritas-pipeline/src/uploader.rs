//! Remote file ingestion.
//!
//! Registers a local file with the inference service and waits until the
//! service reports it ACTIVE:
//!
//! ```text
//! register ──(transient error)──> backoff ──> register (bounded attempts)
//!    │
//!    ▼
//! PENDING ──poll──> PENDING ... (bounded polls) ──> PollTimeout
//!    │
//!    ├──> ACTIVE            => handle returned
//!    └──> FAILED / UNKNOWN  => handle deleted, NotActive
//! ```
//!
//! Any handle that is created but not returned is deleted before the call
//! ends.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use veritas_gemini::{GeminiError, InferenceClient};
use veritas_models::{FileState, RemoteFileHandle};

use crate::config::UploadPolicy;
use crate::error::UploadError;
use crate::retry::{retry_async, RetryResult};

/// Registers files and waits for them to become usable.
#[derive(Clone)]
pub struct Uploader {
    client: Arc<dyn InferenceClient>,
    policy: UploadPolicy,
}

impl Uploader {
    pub fn new(client: Arc<dyn InferenceClient>, policy: UploadPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Upload `path` and return its handle once it is ACTIVE.
    ///
    /// The returned handle must be handed back to [`Uploader::release`].
    pub async fn acquire(&self, path: &Path) -> Result<RemoteFileHandle, UploadError> {
        info!("Uploading file: {}", path.display());

        let retry = self.policy.registration_retry();
        let registered = retry_async(&retry, GeminiError::is_retryable, || {
            self.client.register_file(path)
        })
        .await;

        let handle = match registered {
            RetryResult::Success(handle) => handle,
            RetryResult::Failed { error, attempts } if error.is_retryable() => {
                warn!(
                    "Failed to upload file {} after {} attempts: {}",
                    path.display(),
                    attempts,
                    error
                );
                return Err(UploadError::RetriesExhausted {
                    path: path.to_path_buf(),
                    attempts,
                    source: error,
                });
            }
            RetryResult::Failed { error, attempts } => {
                warn!("Error uploading file {}: {}", path.display(), error);
                return Err(UploadError::Registration {
                    path: path.to_path_buf(),
                    attempts,
                    source: error,
                });
            }
        };

        self.await_active(handle).await
    }

    /// Poll until the handle leaves PENDING, bounded by `max_polls`.
    async fn await_active(
        &self,
        mut handle: RemoteFileHandle,
    ) -> Result<RemoteFileHandle, UploadError> {
        info!(
            "Waiting for file '{}' to become ACTIVE (initial state: {})",
            handle.name, handle.state
        );

        let refresh = self.policy.refresh_retry();
        let mut polls = 0u32;

        while !handle.state.is_settled() {
            if polls >= self.policy.max_polls {
                let name = handle.name.clone();
                warn!("File '{}' still processing after {} checks", name, polls);
                self.release(handle).await;
                return Err(UploadError::PollTimeout { name, polls });
            }

            debug!(
                "File '{}' is processing, waiting {:?}",
                handle.name, self.policy.poll_interval
            );
            tokio::time::sleep(self.policy.poll_interval).await;
            polls += 1;

            let name = handle.name.clone();
            let refreshed = retry_async(&refresh, GeminiError::is_retryable, || {
                self.client.get_file(&name)
            })
            .await;

            match refreshed {
                RetryResult::Success(updated) => {
                    debug!("File '{}' new state: {}", name, updated.state);
                    handle = updated;
                }
                RetryResult::Failed { error, .. } => {
                    warn!("Could not refresh state of '{}': {}", name, error);
                    self.release(handle).await;
                    return Err(UploadError::Poll {
                        name,
                        source: error,
                    });
                }
            }
        }

        if handle.is_active() {
            info!("File '{}' is ACTIVE and ready for use", handle.name);
            return Ok(handle);
        }

        let name = handle.name.clone();
        let state = handle.state;
        match state {
            FileState::Failed => warn!("File processing FAILED for '{}'", name),
            other => warn!("File '{}' is in an unexpected state: {}", name, other),
        }
        self.release(handle).await;
        Err(UploadError::NotActive { name, state })
    }

    /// Delete a handle on the service.
    ///
    /// Takes the handle by value so each acquired handle is released once.
    /// Failures are logged, not returned: the file expires server-side anyway.
    pub async fn release(&self, handle: RemoteFileHandle) {
        debug!("Deleting uploaded file: {}", handle.name);
        match self.client.delete_file(&handle.name).await {
            Ok(()) => info!("Deleted remote file {}", handle.name),
            Err(e) if e.is_not_found() => {
                debug!("Remote file {} was already gone", handle.name)
            }
            Err(e) => warn!("Error deleting remote file {}: {}", handle.name, e),
        }
    }
}
