//! Shared data models for the reel backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video source classification (direct files, streams, provider embeds)
//! - Render requests and responses for the still-to-video pipeline
//! - Job identifiers and caller identity
//! - The fixed render/encoding policy

pub mod encoding;
pub mod job;
pub mod render;
pub mod source;

// Re-export common types
pub use encoding::EncodingConfig;
pub use job::{Caller, JobId};
pub use render::{RenderRequest, RenderResponse, MAX_FRAME_COUNT};
pub use source::{classify, SourceKind, VideoSourceDescriptor};
