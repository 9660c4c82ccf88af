//! Pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryConfig;

/// Upload, polling and retry limits for remote file ingestion.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Registration attempts, including the first one
    pub max_attempts: u32,
    /// Base of the exponential backoff (`base * 2^attempt`)
    pub backoff_base: Duration,
    /// Upper bound for a single backoff delay
    pub max_backoff: Duration,
    /// Wait between state refreshes while a file is processing
    pub poll_interval: Duration,
    /// Refreshes allowed before giving up on a processing file
    pub max_polls: u32,
    /// Extra attempts for a single transient refresh failure
    pub refresh_retries: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
            max_polls: 120, // 10 minutes at the default interval
            refresh_retries: 2,
        }
    }
}

impl UploadPolicy {
    /// Retry settings for file registration.
    pub fn registration_retry(&self) -> RetryConfig {
        RetryConfig::new("file_registration")
            .with_max_retries(self.max_attempts.saturating_sub(1))
            .with_base_delay(self.backoff_base)
            .with_max_delay(self.max_backoff)
    }

    /// Retry settings for a single state refresh while polling.
    pub fn refresh_retry(&self) -> RetryConfig {
        RetryConfig::new("file_state_refresh")
            .with_max_retries(self.refresh_retries)
            .with_base_delay(self.backoff_base)
            .with_max_delay(self.max_backoff)
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upload and polling limits
    pub upload: UploadPolicy,
    /// Directory for the temporary audio artifact
    pub work_dir: PathBuf,
    /// Container extension of the extracted audio (selects the codec)
    pub audio_extension: String,
    /// Run the audio and video analyses concurrently
    pub concurrent_analysis: bool,
    /// FFmpeg is killed after this many seconds
    pub extract_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upload: UploadPolicy::default(),
            work_dir: std::env::temp_dir(),
            audio_extension: "mp3".to_string(),
            concurrent_analysis: false,
            extract_timeout_secs: 600,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = UploadPolicy::default();
        let upload = UploadPolicy {
            max_attempts: env_or("VERITAS_UPLOAD_MAX_ATTEMPTS", defaults.max_attempts).max(1),
            backoff_base: Duration::from_millis(env_or(
                "VERITAS_BACKOFF_BASE_MS",
                defaults.backoff_base.as_millis() as u64,
            )),
            max_backoff: defaults.max_backoff,
            poll_interval: Duration::from_secs(env_or(
                "VERITAS_POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )),
            max_polls: env_or("VERITAS_MAX_POLLS", defaults.max_polls),
            refresh_retries: defaults.refresh_retries,
        };

        Self {
            upload,
            work_dir: std::env::var("VERITAS_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            audio_extension: std::env::var("VERITAS_AUDIO_EXT")
                .ok()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "mp3".to_string()),
            concurrent_analysis: std::env::var("VERITAS_CONCURRENT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            extract_timeout_secs: env_or("VERITAS_EXTRACT_TIMEOUT_SECS", 600u64).max(1),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
