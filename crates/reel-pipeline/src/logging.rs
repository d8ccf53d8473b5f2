//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for render jobs with tracing
//! spans and contextual information.

use std::time::Duration;

use reel_models::JobId;
use tracing::{error, info, warn, Span};

use crate::error::{RenderError, RenderStage};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    canvas_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and operation.
    pub fn new(job_id: &JobId, canvas_id: &str, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            canvas_id: canvas_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Log the start of a job operation.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    /// Log a finished stage and how long it took.
    pub fn log_stage(&self, stage: RenderStage, elapsed: Duration) {
        info!(
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation,
            stage = %stage,
            elapsed_ms = elapsed.as_millis() as u64,
            "Stage completed"
        );
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    /// Log a failed job with its stage and retryability.
    pub fn log_failure(&self, err: &RenderError) {
        error!(
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation,
            stage = %err.stage(),
            retryable = err.is_retryable(),
            error = %err,
            "Job failed"
        );
    }

    /// Log the completion of a job operation.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            canvas_id = %self.canvas_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::from_string("c-1-deadbeef");
        let logger = JobLogger::new(&job_id, "c", "assemble_video");

        assert_eq!(logger.job_id(), "c-1-deadbeef");
        assert_eq!(logger.canvas_id(), "c");
    }
}
