//! Request and response types for the still-to-video render call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Upper bound on synthesized frames per render.
pub const MAX_FRAME_COUNT: u32 = 99_999;

/// Maximum canvas ID length.
pub const MAX_CANVAS_ID_LENGTH: usize = 128;

/// Render a canvas snapshot into a short video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Canvas whose snapshot (`canvas.jpg`) is rendered
    pub canvas_id: String,

    /// Number of identical frames to synthesize
    pub frame_count: u32,

    /// Optional soundtrack muxed into the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
}

impl RenderRequest {
    pub fn new(canvas_id: impl Into<String>, frame_count: u32) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            frame_count,
            music_url: None,
        }
    }

    pub fn with_music(mut self, url: impl Into<String>) -> Self {
        self.music_url = Some(url.into());
        self
    }

    /// Soundtrack URL, ignoring blank values.
    pub fn music_url(&self) -> Option<&str> {
        self.music_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), String> {
        if self.canvas_id.is_empty() {
            return Err("Canvas ID is required".to_string());
        }

        if self.canvas_id.len() > MAX_CANVAS_ID_LENGTH {
            return Err(format!(
                "Canvas ID exceeds maximum length of {} characters",
                MAX_CANVAS_ID_LENGTH
            ));
        }

        if !self
            .canvas_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err("Canvas ID may only contain ASCII letters, digits, '-' and '_'".to_string());
        }

        if self.frame_count == 0 {
            return Err("Frame count must be positive".to_string());
        }

        if self.frame_count > MAX_FRAME_COUNT {
            return Err(format!("Frame count exceeds maximum of {}", MAX_FRAME_COUNT));
        }

        if let Some(music) = self.music_url() {
            let parsed = Url::parse(music).map_err(|e| format!("Invalid music URL: {}", e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("Music URL must use http or https".to_string());
            }
        }

        Ok(())
    }
}

/// Successful render result returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    /// Time-limited HTTPS URL of the published video
    pub video_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = RenderRequest::new("canvas_01", 90).with_music("https://cdn.example.com/a.mp3");
        assert!(request.validate().is_ok());
        assert_eq!(request.music_url(), Some("https://cdn.example.com/a.mp3"));
    }

    #[test]
    fn test_invalid_requests() {
        assert!(RenderRequest::new("", 10).validate().is_err());
        assert!(RenderRequest::new("a/b", 10).validate().is_err());
        assert!(RenderRequest::new("..", 10).validate().is_err());
        assert!(RenderRequest::new("c", 0).validate().is_err());
        assert!(RenderRequest::new("c", MAX_FRAME_COUNT + 1).validate().is_err());
        assert!(RenderRequest::new("c", 1)
            .with_music("file:///etc/passwd")
            .validate()
            .is_err());
        assert!(RenderRequest::new("c", 1).with_music("not a url").validate().is_err());
    }

    #[test]
    fn test_blank_music_is_ignored() {
        let request = RenderRequest::new("c", 1).with_music("   ");
        assert!(request.validate().is_ok());
        assert_eq!(request.music_url(), None);
    }

    #[test]
    fn test_wire_format() {
        let request: RenderRequest =
            serde_json::from_str(r#"{"canvasId":"abc","frameCount":30}"#).unwrap();
        assert_eq!(request.canvas_id, "abc");
        assert_eq!(request.frame_count, 30);
        assert!(request.music_url.is_none());

        let response = serde_json::to_value(RenderResponse {
            video_url: "https://x".to_string(),
        })
        .unwrap();
        assert_eq!(response["videoUrl"], "https://x");
    }
}
