//! Text watermark burned into every exported frame.
//!
//! The watermark is brand policy: fixed text, size, colors and a
//! bottom-right position with a fixed margin. It is rendered with FFmpeg's
//! `drawtext` filter so no extra input or image asset is needed.
//!
//! ```ignore
//! let config = WatermarkConfig::default().with_offset(30, 30);
//! let vf = format!("scale=350:622,{}", config.drawtext_filter());
//! ```

use reel_models::encoding::{
    DEFAULT_WATERMARK_BORDER_COLOR, DEFAULT_WATERMARK_BORDER_WIDTH, DEFAULT_WATERMARK_FONT_COLOR,
    DEFAULT_WATERMARK_FONT_SIZE, DEFAULT_WATERMARK_MARGIN, DEFAULT_WATERMARK_TEXT,
};
use serde::{Deserialize, Serialize};

/// Configuration for the text watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Text drawn on every frame
    pub text: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Fill color
    pub font_color: String,
    /// Outline width in pixels
    pub border_width: u32,
    /// Outline color
    pub border_color: String,
    /// Horizontal offset from right edge (pixels)
    pub offset_x: u32,
    /// Vertical offset from bottom edge (pixels)
    pub offset_y: u32,
    /// Font file; FFmpeg's fontconfig default when unset
    pub font_file: Option<String>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_WATERMARK_TEXT.to_string(),
            font_size: DEFAULT_WATERMARK_FONT_SIZE,
            font_color: DEFAULT_WATERMARK_FONT_COLOR.to_string(),
            border_width: DEFAULT_WATERMARK_BORDER_WIDTH,
            border_color: DEFAULT_WATERMARK_BORDER_COLOR.to_string(),
            offset_x: DEFAULT_WATERMARK_MARGIN,
            offset_y: DEFAULT_WATERMARK_MARGIN,
            font_file: None,
        }
    }
}

impl WatermarkConfig {
    /// Replace the watermark text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set offset from bottom-right corner.
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_font_file(mut self, path: impl Into<String>) -> Self {
        self.font_file = Some(path.into());
        self
    }

    /// Build the `drawtext` filter for this watermark.
    ///
    /// `x=w-tw-X:y=h-th-Y` anchors the text X pixels from the right edge and
    /// Y pixels from the bottom edge.
    pub fn drawtext_filter(&self) -> String {
        let font = self
            .font_file
            .as_deref()
            .map(|f| format!("fontfile='{}':", escape_filter_value(f)))
            .unwrap_or_default();

        format!(
            "drawtext={}text='{}':expansion=none:fontsize={}:fontcolor={}:borderw={}:bordercolor={}:x=w-tw-{}:y=h-th-{}",
            font,
            escape_filter_value(&self.text),
            self.font_size,
            self.font_color,
            self.border_width,
            self.border_color,
            self.offset_x,
            self.offset_y
        )
    }
}

fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}
