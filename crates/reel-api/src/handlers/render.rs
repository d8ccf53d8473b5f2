//! Canvas render handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use reel_models::{RenderRequest, RenderResponse};
use reel_pipeline::{assemble_video, RenderError};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::security::validate_music_url;
use crate::state::AppState;

/// Render the caller's canvas snapshot into a video.
///
/// Authentication is checked before the body is looked at, so an anonymous
/// call gets `unauthenticated` whatever it sent.
pub async fn process_video(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> ApiResult<Json<RenderResponse>> {
    let caller = user.map(|u| u.caller());

    let Json(request) = match payload {
        Ok(body) => body,
        Err(_) if caller.is_none() => return Err(RenderError::Unauthenticated.into()),
        Err(rejection) => return Err(rejection.into()),
    };

    if caller.is_some() {
        if let Some(music) = request.music_url() {
            validate_music_url(music).map_err(ApiError::InvalidArgument)?;
        }
    }

    let output = assemble_video(&state.pipeline, caller.as_ref(), &request).await?;

    info!(
        job_id = %output.job_id,
        video_key = %output.video_key,
        frames = output.frame_count,
        "Render published"
    );

    Ok(Json(RenderResponse {
        video_url: output.access.url,
    }))
}
