//! Application state.

use std::sync::Arc;

use reel_pipeline::AppContext;
use tracing::warn;

use crate::auth::{DenyAll, JwksCache, TokenVerifier};
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<AppContext>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(config: ApiConfig, pipeline: AppContext, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            verifier,
        }
    }

    /// Build production state from the environment.
    ///
    /// Without a Firebase project ID every bearer token is rejected.
    pub async fn from_env(
        config: ApiConfig,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let pipeline = AppContext::from_env().await?;

        let verifier: Arc<dyn TokenVerifier> = match &config.firebase_project_id {
            Some(project_id) => Arc::new(JwksCache::new(project_id.clone()).await?),
            None => {
                warn!("FIREBASE_PROJECT_ID not set; all render calls will be rejected");
                Arc::new(DenyAll)
            }
        };

        Ok(Self::new(config, pipeline, verifier))
    }
}
