//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use reel_media::frames::DEFAULT_COPY_PARALLELISM;
use reel_media::WatermarkConfig;
use reel_models::EncodingConfig;
use reel_storage::delivery::DEFAULT_ACCESS_EXPIRY_SECS;
use reel_storage::keys::DEFAULT_NAMESPACE;
use reel_storage::AccessPolicy;

/// Default wall-clock ceiling for one render call (9 minutes).
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 540;

/// Default working-area ceiling in MiB.
pub const DEFAULT_WORKSPACE_LIMIT_MB: u64 = 2048;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent directory of per-job working areas
    pub work_dir: PathBuf,
    /// Wall-clock ceiling for fetch through publish
    pub job_timeout: Duration,
    /// Maximum bytes a job's frame sequence may occupy
    pub workspace_limit_bytes: u64,
    /// Concurrent frame copies
    pub frame_copy_parallelism: usize,
    /// Lifetime of returned video URLs
    pub access_policy: AccessPolicy,
    /// Top-level storage prefix for canvas objects
    pub storage_namespace: String,
    /// Delete the source snapshot after a successful render
    pub delete_source: bool,
    /// Watermark text
    pub watermark_text: String,
    /// Watermark font file
    pub watermark_font_file: Option<String>,
    /// Fixed render policy
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            workspace_limit_bytes: DEFAULT_WORKSPACE_LIMIT_MB * 1024 * 1024,
            frame_copy_parallelism: DEFAULT_COPY_PARALLELISM,
            access_policy: AccessPolicy::default(),
            storage_namespace: DEFAULT_NAMESPACE.to_string(),
            delete_source: true,
            watermark_text: WatermarkConfig::default().text,
            watermark_font_file: None,
            encoding: EncodingConfig::default(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("reel")
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("RENDER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            job_timeout: Duration::from_secs(
                env_parse("RENDER_TIMEOUT_SECS").unwrap_or(DEFAULT_JOB_TIMEOUT_SECS),
            ),
            workspace_limit_bytes: env_parse::<u64>("RENDER_WORKSPACE_LIMIT_MB")
                .unwrap_or(DEFAULT_WORKSPACE_LIMIT_MB)
                .saturating_mul(1024 * 1024),
            frame_copy_parallelism: env_parse::<usize>("RENDER_FRAME_COPY_PARALLELISM")
                .unwrap_or(DEFAULT_COPY_PARALLELISM)
                .max(1),
            access_policy: AccessPolicy::from_secs(
                env_parse("ACCESS_URL_EXPIRY_SECS").unwrap_or(DEFAULT_ACCESS_EXPIRY_SECS),
            ),
            storage_namespace: std::env::var("STORAGE_NAMESPACE")
                .unwrap_or(defaults.storage_namespace),
            delete_source: env_bool("RENDER_DELETE_SOURCE").unwrap_or(true),
            watermark_text: std::env::var("RENDER_WATERMARK_TEXT")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(defaults.watermark_text),
            watermark_font_file: std::env::var("RENDER_WATERMARK_FONT").ok(),
            encoding: defaults.encoding,
        }
    }

    /// Watermark burned into rendered videos.
    pub fn watermark(&self) -> WatermarkConfig {
        let watermark = WatermarkConfig::default().with_text(&self.watermark_text);
        match &self.watermark_font_file {
            Some(font) => watermark.with_font_file(font),
            None => watermark,
        }
    }
}
