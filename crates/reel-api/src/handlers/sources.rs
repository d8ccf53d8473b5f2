//! Video source classification.

use axum::extract::Query;
use axum::Json;
use reel_models::{classify, VideoSourceDescriptor};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub url: String,
}

/// Classify a user-supplied video link. Never fails; unrecognized input
/// yields an `unknown` descriptor.
pub async fn classify_source(Query(query): Query<ClassifyQuery>) -> Json<VideoSourceDescriptor> {
    Json(classify(&query.url))
}
