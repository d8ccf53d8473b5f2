//! Render and encoding policy.
//!
//! Every exported video uses the same fixed geometry, rate and codec settings
//! regardless of the source image, so these are policy constants rather than
//! caller inputs.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rate at which the synthesized frame sequence is read.
pub const INPUT_FRAME_RATE: u32 = 30;
/// Output frame width in pixels.
pub const OUTPUT_WIDTH: u32 = 350;
/// Output frame height in pixels.
pub const OUTPUT_HEIGHT: u32 = 622;
/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Pixel format widely decodable on mobile devices
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "veryfast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 28;
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Content type of published renders
pub const OUTPUT_CONTENT_TYPE: &str = "video/mp4";

/// Brand watermark burned into every frame.
pub const DEFAULT_WATERMARK_TEXT: &str = "made with reel";
pub const DEFAULT_WATERMARK_FONT_SIZE: u32 = 24;
pub const DEFAULT_WATERMARK_FONT_COLOR: &str = "white";
pub const DEFAULT_WATERMARK_BORDER_WIDTH: u32 = 2;
pub const DEFAULT_WATERMARK_BORDER_COLOR: &str = "black";
/// Distance from the bottom-right corner in pixels
pub const DEFAULT_WATERMARK_MARGIN: u32 = 20;

/// Video encoding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    /// Frame rate of the image sequence input
    #[serde(default = "default_input_frame_rate")]
    pub input_frame_rate: u32,

    /// Output width
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output height
    #[serde(default = "default_height")]
    pub height: u32,

    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Encoding preset (e.g., "veryfast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec used when a soundtrack is muxed in
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

fn default_input_frame_rate() -> u32 {
    INPUT_FRAME_RATE
}
fn default_width() -> u32 {
    OUTPUT_WIDTH
}
fn default_height() -> u32 {
    OUTPUT_HEIGHT
}
fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            input_frame_rate: INPUT_FRAME_RATE,
            width: OUTPUT_WIDTH,
            height: OUTPUT_HEIGHT,
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
        }
    }
}

impl EncodingConfig {
    /// Output geometry as an FFmpeg `scale` argument.
    pub fn scale_filter(&self) -> String {
        format!("scale={}:{}", self.width, self.height)
    }
}
