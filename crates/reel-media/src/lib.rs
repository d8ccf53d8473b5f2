#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for still-to-video rendering.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeout support via tokio
//! - Frame sequence synthesis from a single still image
//! - Text watermark overlay filters
//! - The `Encoder` capability used by the render pipeline

pub mod command;
pub mod encoder;
pub mod error;
pub mod frames;
pub mod progress;
pub mod watermark;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use encoder::{EncodeSpec, Encoder, FfmpegEncoder};
pub use error::{MediaError, MediaResult};
pub use frames::{frame_pad_width, synthesize_frames, FrameSequence, SynthesisOptions};
pub use progress::FfmpegProgress;
pub use watermark::WatermarkConfig;
