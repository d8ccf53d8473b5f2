//! Render job identity and caller identity.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a render job.
///
/// Derived from the canvas ID, the job start time and a random suffix, so two
/// exports of the same canvas started within the same millisecond still get
/// distinct working areas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a job ID for a canvas render started at `started_at`.
    pub fn for_canvas(canvas_id: &str, started_at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}-{}",
            canvas_id,
            started_at.timestamp_millis(),
            &suffix[..8]
        ))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Random part of the ID, distinct for jobs started in the same millisecond.
    pub fn unique_suffix(&self) -> &str {
        self.0.rsplit_once('-').map_or(self.as_str(), |(_, suffix)| suffix)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated identity of whoever invoked a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub uid: String,
    pub email: Option<String>,
}

impl Caller {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}
