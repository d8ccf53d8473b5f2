//! Frame-sequence synthesis.
//!
//! A render turns one still image into a video by repeating it. The encoder
//! reads the repeated image as an `image2` sequence, so every copy gets a
//! sequential, zero-padded name starting at 1.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::fs;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// File name prefix of synthesized frames.
pub const FRAME_PREFIX: &str = "frame_";

/// Minimum zero-padding width of frame numbers.
pub const MIN_FRAME_PAD_WIDTH: usize = 4;

/// Default number of concurrent frame copies.
pub const DEFAULT_COPY_PARALLELISM: usize = 8;

/// Zero-padding width needed to name `count` frames without collisions.
///
/// At least four digits, widened when `count` has more digits than that.
pub fn frame_pad_width(count: u32) -> usize {
    count.to_string().len().max(MIN_FRAME_PAD_WIDTH)
}

/// A synthesized, sequentially numbered frame sequence on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    dir: PathBuf,
    extension: String,
    count: u32,
    pad_width: usize,
}

impl FrameSequence {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, count: u32) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            count,
            pad_width: frame_pad_width(count),
        }
    }

    /// Directory holding the frames.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    /// Number of the first frame.
    pub fn start_number(&self) -> u32 {
        1
    }

    /// File name of frame `index` (1-based).
    pub fn frame_name(&self, index: u32) -> String {
        format!(
            "{}{:0width$}.{}",
            FRAME_PREFIX,
            index,
            self.extension,
            width = self.pad_width
        )
    }

    /// Path of frame `index` (1-based).
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir.join(self.frame_name(index))
    }

    /// All frame paths in sequence order.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (self.start_number()..self.start_number() + self.count).map(|i| self.frame_path(i))
    }

    /// FFmpeg `image2` input pattern, e.g. `<dir>/frame_%04d.jpg`.
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(format!(
            "{}%0{}d.{}",
            FRAME_PREFIX, self.pad_width, self.extension
        ))
    }
}

/// Options for [`synthesize_frames`].
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Maximum concurrent copies
    pub parallelism: usize,
    /// Upper bound on the bytes the sequence may occupy
    pub max_total_bytes: Option<u64>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_COPY_PARALLELISM,
            max_total_bytes: None,
        }
    }
}

/// Copy `source` into `dir` as `count` sequentially numbered frames.
///
/// Copies are independent, so they run with bounded concurrency. The
/// sequence's total size is checked against `options.max_total_bytes`
/// before anything is written.
pub async fn synthesize_frames(
    source: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    count: u32,
    options: &SynthesisOptions,
) -> MediaResult<FrameSequence> {
    let source = source.as_ref();
    let dir = dir.as_ref();

    if count == 0 {
        return Err(MediaError::invalid_input("Frame count must be positive"));
    }

    let metadata = match fs::metadata(source).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MediaError::FileNotFound(source.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(MediaError::invalid_input(format!(
            "Frame source is not a file: {}",
            source.display()
        )));
    }

    if let Some(limit) = options.max_total_bytes {
        let needed = metadata.len().saturating_mul(u64::from(count));
        if needed > limit {
            return Err(MediaError::resource_limit(format!(
                "{} frames of {} bytes need {} bytes, limit is {}",
                count,
                metadata.len(),
                needed,
                limit
            )));
        }
    }

    fs::create_dir_all(dir).await?;

    let extension = source
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    let sequence = FrameSequence::new(dir, extension, count);

    debug!(
        source = %source.display(),
        count,
        pattern = %sequence.pattern().display(),
        "Synthesizing frame sequence"
    );

    stream::iter(sequence.paths())
        .map(|target| async move { fs::copy(source, &target).await.map(|_| ()) })
        .buffer_unordered(options.parallelism.max(1))
        .try_collect::<()>()
        .await?;

    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pad_width() {
        assert_eq!(frame_pad_width(1), 4);
        assert_eq!(frame_pad_width(9999), 4);
        assert_eq!(frame_pad_width(10_000), 5);
        assert_eq!(frame_pad_width(99_999), 5);
    }

    #[test]
    fn test_sequence_naming() {
        let seq = FrameSequence::new("/work", "jpg", 90);
        assert_eq!(seq.frame_name(1), "frame_0001.jpg");
        assert_eq!(seq.frame_name(90), "frame_0090.jpg");
        assert_eq!(seq.pattern(), PathBuf::from("/work/frame_%04d.jpg"));

        let wide = FrameSequence::new("/work", "jpg", 12_000);
        assert_eq!(wide.frame_name(1), "frame_00001.jpg");
        assert_eq!(wide.pattern(), PathBuf::from("/work/frame_%05d.jpg"));
    }

    #[tokio::test]
    async fn test_synthesize_writes_every_frame() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("canvas.jpg");
        std::fs::write(&source, b"jpeg-bytes").unwrap();
        let frames_dir = tmp.path().join("frames");

        let seq = synthesize_frames(&source, &frames_dir, 25, &SynthesisOptions::default())
            .await
            .unwrap();

        assert_eq!(seq.count(), 25);
        let mut names: Vec<String> = std::fs::read_dir(&frames_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names.len(), 25);
        assert_eq!(names.first().map(String::as_str), Some("frame_0001.jpg"));
        assert_eq!(names.last().map(String::as_str), Some("frame_0025.jpg"));
        assert_eq!(std::fs::read(seq.frame_path(13)).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_zero_count_rejected() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("canvas.jpg");
        std::fs::write(&source, b"x").unwrap();

        let err = synthesize_frames(&source, tmp.path(), 0, &SynthesisOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = synthesize_frames(
            tmp.path().join("missing.jpg"),
            tmp.path(),
            3,
            &SynthesisOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_budget_exceeded_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("canvas.jpg");
        std::fs::write(&source, vec![0u8; 1024]).unwrap();
        let frames_dir = tmp.path().join("frames");
        let options = SynthesisOptions {
            parallelism: 2,
            max_total_bytes: Some(10 * 1024),
        };

        let err = synthesize_frames(&source, &frames_dir, 11, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ResourceLimit(_)));
        assert!(!frames_dir.exists());
    }
}
