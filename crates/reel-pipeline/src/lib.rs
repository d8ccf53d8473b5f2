//! Still-image to video render pipeline.
//!
//! One call of [`assemble_video`] fetches a canvas snapshot, repeats it into
//! a frame sequence, encodes it with the fixed render policy, publishes the
//! video and returns a time-limited URL. Every job runs in its own working
//! area, which is removed before the call returns.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod render_job;
pub mod workspace;

pub use config::PipelineConfig;
pub use context::AppContext;
pub use error::{RenderError, RenderResult, RenderStage};
pub use logging::JobLogger;
pub use render_job::{assemble_video, best_effort_delete_source, RenderOutput};
pub use workspace::JobWorkspace;
