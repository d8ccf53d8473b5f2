//! Render error types.

use std::fmt;

use reel_media::MediaError;
use reel_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

/// Pipeline stage, used to label failures in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Auth,
    Validate,
    Provision,
    Fetch,
    Synthesize,
    Encode,
    Publish,
    Timeout,
}

impl RenderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStage::Auth => "auth",
            RenderStage::Validate => "validate",
            RenderStage::Provision => "provision",
            RenderStage::Fetch => "fetch",
            RenderStage::Synthesize => "synthesize",
            RenderStage::Encode => "encode",
            RenderStage::Publish => "publish",
            RenderStage::Timeout => "timeout",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Caller is not authenticated")]
    Unauthenticated,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to provision working area: {0}")]
    Provision(#[source] std::io::Error),

    #[error("Failed to fetch source: {0}")]
    Fetch(#[source] StorageError),

    #[error("Failed to synthesize frames: {0}")]
    Synthesis(#[source] MediaError),

    #[error("Encoding failed: {0}")]
    Encode(#[source] MediaError),

    #[error("Failed to publish video: {0}")]
    Publish(#[source] StorageError),

    #[error("Render timed out after {secs}s during {interrupted}")]
    Timeout { secs: u64, interrupted: RenderStage },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RenderError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stage the failure is attributed to.
    pub fn stage(&self) -> RenderStage {
        match self {
            RenderError::Unauthenticated => RenderStage::Auth,
            RenderError::InvalidArgument(_) | RenderError::Config(_) => RenderStage::Validate,
            RenderError::Provision(_) => RenderStage::Provision,
            RenderError::Fetch(_) => RenderStage::Fetch,
            RenderError::Synthesis(_) => RenderStage::Synthesize,
            RenderError::Encode(_) => RenderStage::Encode,
            RenderError::Publish(_) => RenderStage::Publish,
            RenderError::Timeout { .. } => RenderStage::Timeout,
        }
    }

    /// Check if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RenderError::Fetch(e) | RenderError::Publish(e) => e.is_transient(),
            RenderError::Timeout { .. } | RenderError::Provision(_) => true,
            RenderError::Synthesis(e) => matches!(e, MediaError::Io(_)),
            _ => false,
        }
    }

    /// Failure caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RenderError::Unauthenticated | RenderError::InvalidArgument(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(RenderError::Unauthenticated.stage().as_str(), "auth");
        assert_eq!(
            RenderError::Encode(MediaError::Timeout(30)).stage().to_string(),
            "encode"
        );
        let timeout = RenderError::Timeout {
            secs: 540,
            interrupted: RenderStage::Encode,
        };
        assert_eq!(timeout.stage(), RenderStage::Timeout);
        assert!(timeout.to_string().contains("during encode"));
    }

    #[test]
    fn test_retryability() {
        assert!(RenderError::Publish(StorageError::upload_failed("503")).is_retryable());
        assert!(!RenderError::Fetch(StorageError::not_found("k")).is_retryable());
        assert!(!RenderError::Encode(MediaError::ffmpeg_failed("bad", None, Some(1))).is_retryable());
        assert!(!RenderError::Unauthenticated.is_retryable());
        assert!(RenderError::Unauthenticated.is_client_error());
        assert!(!RenderError::Fetch(StorageError::not_found("k")).is_client_error());
    }
}
