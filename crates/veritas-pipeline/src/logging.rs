//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for pipeline runs with tracing
//! spans and contextual information.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

use crate::pipeline::PipelineStage;

/// Run logger for structured logging with consistent formatting.
///
/// Every event carries the run ID and the input being analyzed, so the
/// interleaved output of concurrent analyses stays attributable.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    input: String,
}

impl RunLogger {
    /// Create a logger with a fresh run ID.
    pub fn new(input: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            input: input.to_string(),
        }
    }

    pub fn log_start(&self) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Run started"
        );
    }

    /// Log a stage transition.
    pub fn log_stage(&self, from: PipelineStage, to: PipelineStage) {
        info!(
            run_id = %self.run_id,
            stage = %to,
            "Stage {} -> {}", from, to
        );
    }

    pub fn log_warning(&self, stage: PipelineStage, message: &str) {
        warn!(
            run_id = %self.run_id,
            stage = %stage,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, stage: PipelineStage, message: &str) {
        error!(
            run_id = %self.run_id,
            stage = %stage,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            input = %self.input,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            input = %self.input
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("/videos/interview.mp4");

        assert_eq!(logger.input(), "/videos/interview.mp4");
        assert!(Uuid::parse_str(logger.run_id()).is_ok());
    }

    #[test]
    fn test_fresh_run_ids_differ() {
        let a = RunLogger::new("x.mp4");
        let b = RunLogger::new("x.mp4");
        assert_ne!(a.run_id(), b.run_id());
    }
}
