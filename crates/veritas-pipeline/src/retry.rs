//! Retry utilities with exponential backoff.
//!
//! Provides the retry pattern used around calls to the inference service:
//! the caller decides which errors are transient, everything else fails
//! immediately.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Operation name for logging.
    pub operation_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            operation_name: "operation".to_string(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given operation name.
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay for exponential backoff.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the upper bound for a single delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay after the `attempt`-th failure: `base * 2^attempt`, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.base_delay.saturating_mul(factor);
        delay.min(self.max_delay)
    }
}

/// Result of a retry operation.
#[derive(Debug)]
pub enum RetryResult<T, E> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed permanently or after all retries were exhausted.
    Failed { error: E, attempts: u32 },
}

/// Execute an async operation, retrying errors accepted by `should_retry`.
///
/// Errors rejected by `should_retry` end the loop at once. No delay follows
/// the final attempt.
///
/// # Example
/// ```ignore
/// let config = RetryConfig::new("file_registration").with_max_retries(2);
/// let result = retry_async(&config, GeminiError::is_retryable, || {
///     client.register_file(path)
/// }).await;
/// ```
pub async fn retry_async<F, Fut, T, E, P>(
    config: &RetryConfig,
    should_retry: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if attempt < config.max_retries && should_retry(&e) => {
                attempt += 1;
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    config.operation_name,
                    attempt,
                    config.max_retries + 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                debug!(
                    "{} giving up after {} attempt(s): {}",
                    config.operation_name,
                    attempt + 1,
                    e
                );
                return RetryResult::Failed {
                    error: e,
                    attempts: attempt + 1,
                };
            }
        }
    }
}
