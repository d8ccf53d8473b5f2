//! The encode capability used by the render pipeline.
//!
//! The pipeline only sees the [`Encoder`] trait. [`EncodeSpec`] describes the
//! whole encode (frames, policy, watermark, optional soundtrack, output) and
//! knows how to turn itself into an FFmpeg command, so fakes can inspect the
//! exact arguments without a media toolchain.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reel_models::EncodingConfig;
use tokio::fs;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::frames::FrameSequence;
use crate::watermark::WatermarkConfig;

/// Everything needed to encode one frame sequence into a video.
#[derive(Debug, Clone)]
pub struct EncodeSpec {
    /// Synthesized input frames
    pub frames: FrameSequence,
    /// Fixed render policy
    pub encoding: EncodingConfig,
    /// Text overlay burned into every frame
    pub watermark: WatermarkConfig,
    /// Optional soundtrack (URL or local path)
    pub audio: Option<String>,
    /// Output file
    pub output: PathBuf,
}

impl EncodeSpec {
    pub fn new(frames: FrameSequence, output: impl Into<PathBuf>) -> Self {
        Self {
            frames,
            encoding: EncodingConfig::default(),
            watermark: WatermarkConfig::default(),
            audio: None,
            output: output.into(),
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_watermark(mut self, watermark: WatermarkConfig) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn with_audio(mut self, audio: Option<String>) -> Self {
        self.audio = audio;
        self
    }

    /// Video filter chain: scale to the output geometry, square pixels,
    /// then the watermark.
    pub fn video_filter(&self) -> String {
        format!(
            "{},setsar=1,{}",
            self.encoding.scale_filter(),
            self.watermark.drawtext_filter()
        )
    }

    /// Build the FFmpeg command for this encode.
    pub fn to_command(&self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(self.frames.pattern(), &self.output)
            .frame_rate(self.encoding.input_frame_rate)
            .input_arg("-start_number")
            .input_arg(self.frames.start_number().to_string());

        if let Some(audio) = &self.audio {
            cmd = cmd.add_input(audio.clone());
        }

        cmd = cmd.video_filter(self.video_filter()).map("0:v");

        if self.audio.is_some() {
            cmd = cmd
                .map("1:a")
                .audio_codec(&self.encoding.audio_codec)
                .audio_bitrate(&self.encoding.audio_bitrate)
                .shortest();
        }

        cmd.video_codec(&self.encoding.codec)
            .pixel_format(&self.encoding.pixel_format)
            .preset(&self.encoding.preset)
            .crf(self.encoding.crf)
            .faststart()
    }
}

/// Opaque encode operation: materialize `spec.output` or fail.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Encode and return the path of the produced file.
    async fn run(&self, spec: &EncodeSpec) -> MediaResult<PathBuf>;
}

/// [`Encoder`] backed by the `ffmpeg` binary.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEncoder {
    timeout_secs: Option<u64>,
}

impl FfmpegEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the encoder if it runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn run(&self, spec: &EncodeSpec) -> MediaResult<PathBuf> {
        let cmd = spec.to_command();
        let mut runner = FfmpegRunner::new();
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        let total = u64::from(spec.frames.count());
        info!(
            frames = total,
            with_audio = spec.audio.is_some(),
            output = %spec.output.display(),
            "Encoding frame sequence"
        );

        runner
            .run_with_progress(&cmd, move |progress| {
                debug!(
                    frame = progress.frame,
                    total,
                    percent = progress.frame_percentage(total),
                    "Encode progress"
                );
            })
            .await?;

        verify_output(&spec.output).await?;
        Ok(spec.output.clone())
    }
}

/// Ensure the encoder actually materialized a non-empty file.
async fn verify_output(path: &Path) -> MediaResult<()> {
    match fs::metadata(path).await {
        Ok(m) if m.len() > 0 => Ok(()),
        Ok(_) => Err(MediaError::InvalidVideo(format!(
            "Encoder produced an empty file: {}",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(MediaError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}
