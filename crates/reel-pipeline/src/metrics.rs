//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the binary decides which exporter
//! (if any) is installed.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::error::RenderStage;

/// Metric names as constants for consistency.
pub mod names {
    pub const RENDER_JOBS_TOTAL: &str = "reel_render_jobs_total";
    pub const RENDER_STAGE_DURATION_SECONDS: &str = "reel_render_stage_duration_seconds";
    pub const RENDER_FRAMES_TOTAL: &str = "reel_render_frames_total";
    pub const SOURCE_DELETE_FAILURES_TOTAL: &str = "reel_source_delete_failures_total";
}

/// Record a finished render. `stage` is `None` on success.
pub fn record_job(stage: Option<RenderStage>) {
    let outcome = if stage.is_none() { "success" } else { "failure" };
    let labels = [
        ("outcome", outcome.to_string()),
        ("stage", stage.map_or("none", |s| s.as_str()).to_string()),
    ];
    counter!(names::RENDER_JOBS_TOTAL, &labels).increment(1);
}

/// Record how long a stage took.
pub fn record_stage_duration(stage: RenderStage, elapsed: Duration) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::RENDER_STAGE_DURATION_SECONDS, &labels).record(elapsed.as_secs_f64());
}

/// Record synthesized frames.
pub fn record_frames(count: u32) {
    counter!(names::RENDER_FRAMES_TOTAL).increment(u64::from(count));
}

pub fn record_source_delete_failure() {
    counter!(names::SOURCE_DELETE_FAILURES_TOTAL).increment(1);
}
