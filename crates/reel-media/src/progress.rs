//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Frames written so far
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Percentage of a known frame total written so far.
    pub fn frame_percentage(&self, total_frames: u64) -> f64 {
        if total_frames == 0 {
            return 0.0;
        }
        ((self.frame as f64 / total_frames as f64) * 100.0).min(100.0)
    }

    /// Estimate seconds remaining from the current encoding FPS.
    pub fn eta_seconds(&self, total_frames: u64) -> Option<f64> {
        if self.fps <= 0.0 {
            return None;
        }
        let remaining = total_frames.saturating_sub(self.frame);
        Some(remaining as f64 / self.fps)
    }

    /// Parse one line of `-progress` output into the running state.
    ///
    /// Returns a snapshot at the end of each progress block.
    pub fn apply_line(&mut self, line: &str) -> Option<FfmpegProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            "out_time_us" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    self.fps = fps;
                }
            }
            "speed" => {
                // "1.5x" or "N/A"
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    self.is_complete = true;
                }
                return Some(self.clone());
            }
            _ => {}
        }
        None
    }
}

/// Whether a stderr line belongs to the `-progress` key/value stream.
pub fn is_progress_line(line: &str) -> bool {
    const KEYS: &[&str] = &[
        "frame", "fps", "stream_", "bitrate", "total_size", "out_time", "dup_frames",
        "drop_frames", "speed", "progress",
    ];
    match line.trim().split_once('=') {
        Some((key, _)) => KEYS.iter().any(|k| key.starts_with(k)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        assert!(progress.apply_line("frame=45").is_none());
        assert_eq!(progress.frame, 45);

        progress.apply_line("out_time_us=1500000");
        assert_eq!(progress.out_time_ms, 1500);

        progress.apply_line("speed=1.5x");
        assert!((progress.speed - 1.5).abs() < 0.01);

        progress.apply_line("speed=N/A");
        assert!((progress.speed - 1.5).abs() < 0.01);

        let snapshot = progress.apply_line("progress=end").unwrap();
        assert!(snapshot.is_complete);
        assert_eq!(snapshot.frame, 45);
    }

    #[test]
    fn test_frame_percentage() {
        let progress = FfmpegProgress {
            frame: 45,
            fps: 90.0,
            ..Default::default()
        };

        assert!((progress.frame_percentage(90) - 50.0).abs() < 0.01);
        assert_eq!(progress.frame_percentage(0), 0.0);
        assert!((progress.eta_seconds(90).unwrap() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_progress_line_detection() {
        assert!(is_progress_line("out_time_us=100"));
        assert!(is_progress_line("stream_0_0_q=28.0"));
        assert!(!is_progress_line("[libx264 @ 0x1] using cpu capabilities"));
        assert!(!is_progress_line("Error opening input file"));
    }
}
