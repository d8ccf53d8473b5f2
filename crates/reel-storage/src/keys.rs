//! Object key layout.
//!
//! ```text
//! <namespace>/<canvas_id>/canvas.jpg              source snapshot
//! <namespace>/<canvas_id>/final_<timestamp>_<job>.mp4   rendered video
//! ```

use crate::error::{StorageError, StorageResult};

/// Default top-level prefix for canvas objects.
pub const DEFAULT_NAMESPACE: &str = "canvases";

/// File name of a canvas' source snapshot.
pub const SOURCE_OBJECT_NAME: &str = "canvas.jpg";

/// Content type of source snapshots.
pub const SOURCE_CONTENT_TYPE: &str = "image/jpeg";

/// Builds object keys for canvas sources and rendered outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    namespace: String,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageLayout {
    /// Layout rooted at `namespace`, which may itself contain `/` separators.
    pub fn new(namespace: impl Into<String>) -> StorageResult<Self> {
        let namespace = namespace.into().trim_matches('/').to_string();
        if namespace.is_empty() {
            return Err(StorageError::invalid_key("namespace must not be empty"));
        }
        for segment in namespace.split('/') {
            validate_segment(segment)?;
        }
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Prefix holding every object of a canvas.
    pub fn canvas_prefix(&self, canvas_id: &str) -> StorageResult<String> {
        validate_segment(canvas_id)?;
        Ok(format!("{}/{}", self.namespace, canvas_id))
    }

    /// Key of the canvas' source snapshot.
    pub fn source_key(&self, canvas_id: &str) -> StorageResult<String> {
        Ok(format!(
            "{}/{}",
            self.canvas_prefix(canvas_id)?,
            SOURCE_OBJECT_NAME
        ))
    }

    /// Key of a rendered video, namespaced by the render timestamp and the
    /// job's unique suffix so concurrent renders of one canvas never share it.
    pub fn output_key(
        &self,
        canvas_id: &str,
        timestamp_millis: i64,
        job_suffix: &str,
    ) -> StorageResult<String> {
        validate_segment(job_suffix)?;
        Ok(format!(
            "{}/final_{}_{}.mp4",
            self.canvas_prefix(canvas_id)?,
            timestamp_millis,
            job_suffix
        ))
    }
}

fn validate_segment(segment: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Err(StorageError::invalid_key("empty key segment"));
    }
    if segment == "." || segment == ".." || segment.contains("..") {
        return Err(StorageError::invalid_key(format!(
            "path traversal in key segment: {}",
            segment
        )));
    }
    if segment.contains('/') || segment.contains('\\') {
        return Err(StorageError::invalid_key(format!(
            "separator in key segment: {}",
            segment
        )));
    }
    if segment.chars().any(char::is_control) {
        return Err(StorageError::invalid_key("control character in key segment"));
    }
    Ok(())
}
