//! Application context shared by every render call.

use std::sync::Arc;

use reel_media::{Encoder, FfmpegEncoder};
use reel_storage::{ObjectStore, R2Client, StorageLayout};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{RenderError, RenderResult};

/// Collaborators and settings for the render pipeline.
///
/// Built once at process start and passed by reference into every call.
/// Tests build it with in-memory storage and a fake encoder.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn ObjectStore>,
    pub encoder: Arc<dyn Encoder>,
    pub config: PipelineConfig,
    pub layout: StorageLayout,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        encoder: Arc<dyn Encoder>,
        config: PipelineConfig,
    ) -> RenderResult<Self> {
        let layout = StorageLayout::new(config.storage_namespace.clone())
            .map_err(|e| RenderError::config_error(e.to_string()))?;
        Ok(Self {
            store,
            encoder,
            config,
            layout,
        })
    }

    /// Production context: S3-compatible storage and the FFmpeg encoder,
    /// configured from the environment.
    pub async fn from_env() -> RenderResult<Self> {
        let config = PipelineConfig::from_env();
        let store = R2Client::from_env()
            .await
            .map_err(|e| RenderError::config_error(e.to_string()))?;
        let encoder = FfmpegEncoder::new().with_timeout(config.job_timeout.as_secs());

        info!(
            bucket = store.bucket(),
            namespace = %config.storage_namespace,
            work_dir = %config.work_dir.display(),
            timeout_secs = config.job_timeout.as_secs(),
            "Render pipeline configured"
        );

        Self::new(Arc::new(store), Arc::new(encoder), config)
    }
}
