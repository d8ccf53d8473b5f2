//! Render job processing.
//!
//! Stages run strictly in sequence: fetch the canvas snapshot, synthesize the
//! frame sequence, encode, publish and grant access. The working area is
//! removed on every path out of [`assemble_video`], and removing it never
//! replaces an earlier error.

use std::time::Instant;

use chrono::Utc;
use reel_media::{synthesize_frames, EncodeSpec, SynthesisOptions};
use reel_models::encoding::OUTPUT_CONTENT_TYPE;
use reel_models::{Caller, JobId, RenderRequest};
use reel_storage::{grant_access, AccessUrl, ObjectStore, StorageResult};
use tracing::{debug, warn, Instrument};

use crate::context::AppContext;
use crate::error::{RenderError, RenderResult, RenderStage};
use crate::logging::JobLogger;
use crate::metrics;
use crate::workspace::JobWorkspace;

/// Operation name attached to job logs.
pub const OPERATION: &str = "assemble_video";

/// A published render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub job_id: JobId,
    /// Object key of the published video
    pub video_key: String,
    /// Time-limited read URL for `video_key`
    pub access: AccessUrl,
    pub frame_count: u32,
}

impl RenderOutput {
    pub fn video_url(&self) -> &str {
        &self.access.url
    }
}

/// Keys a render reads and writes.
struct JobKeys {
    source: String,
    output: String,
}

/// Render a canvas snapshot into a published video.
///
/// `caller` must be present; an anonymous call fails with
/// [`RenderError::Unauthenticated`] before any storage or filesystem access.
pub async fn assemble_video(
    ctx: &AppContext,
    caller: Option<&Caller>,
    request: &RenderRequest,
) -> RenderResult<RenderOutput> {
    let Some(caller) = caller else {
        warn!(canvas_id = %request.canvas_id, "Rejected unauthenticated render");
        metrics::record_job(Some(RenderStage::Auth));
        return Err(RenderError::Unauthenticated);
    };

    let started_at = Utc::now();
    let job_id = JobId::for_canvas(&request.canvas_id, started_at);
    let keys = match admit(ctx, request, started_at.timestamp_millis(), &job_id) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(canvas_id = %request.canvas_id, uid = %caller.uid, error = %e, "Rejected render request");
            metrics::record_job(Some(e.stage()));
            return Err(e);
        }
    };

    let logger = JobLogger::new(&job_id, &request.canvas_id, OPERATION);
    let span = logger.create_span();

    let result = execute(ctx, caller, request, &job_id, &keys, &logger)
        .instrument(span)
        .await;

    match &result {
        Ok(output) => {
            logger.log_completion(&format!("published {}", output.video_key));
            metrics::record_job(None);
        }
        Err(e) => {
            logger.log_failure(e);
            metrics::record_job(Some(e.stage()));
        }
    }

    result
}

/// Validate the request and derive its object keys.
fn admit(
    ctx: &AppContext,
    request: &RenderRequest,
    timestamp_millis: i64,
    job_id: &JobId,
) -> RenderResult<JobKeys> {
    request.validate().map_err(RenderError::InvalidArgument)?;

    let source = ctx
        .layout
        .source_key(&request.canvas_id)
        .map_err(|e| RenderError::invalid_argument(e.to_string()))?;
    let output = ctx
        .layout
        .output_key(&request.canvas_id, timestamp_millis, job_id.unique_suffix())
        .map_err(|e| RenderError::invalid_argument(e.to_string()))?;

    Ok(JobKeys { source, output })
}

async fn execute(
    ctx: &AppContext,
    caller: &Caller,
    request: &RenderRequest,
    job_id: &JobId,
    keys: &JobKeys,
    logger: &JobLogger,
) -> RenderResult<RenderOutput> {
    logger.log_start(&format!(
        "uid={} frames={} music={}",
        caller.uid,
        request.frame_count,
        request.music_url().is_some()
    ));

    let workspace =
        JobWorkspace::create(&ctx.config.work_dir, job_id).map_err(RenderError::Provision)?;

    let limit = ctx.config.job_timeout;
    let mut stage = RenderStage::Fetch;
    let outcome = tokio::time::timeout(
        limit,
        run_stages(ctx, &workspace, request, keys, logger, &mut stage),
    )
    .await;
    let result = outcome.unwrap_or_else(|_| {
        Err(RenderError::Timeout {
            secs: limit.as_secs(),
            interrupted: stage,
        })
    });

    if let Err(e) = workspace.close().await {
        logger.log_warning(&format!("Failed to remove working area: {}", e));
    }

    let access = result?;

    if ctx.config.delete_source {
        if let Err(e) = best_effort_delete_source(ctx.store.as_ref(), &keys.source).await {
            metrics::record_source_delete_failure();
            logger.log_warning(&format!("Failed to delete source {}: {}", keys.source, e));
        }
    }

    Ok(RenderOutput {
        job_id: job_id.clone(),
        video_key: keys.output.clone(),
        access,
        frame_count: request.frame_count,
    })
}

async fn run_stages(
    ctx: &AppContext,
    workspace: &JobWorkspace,
    request: &RenderRequest,
    keys: &JobKeys,
    logger: &JobLogger,
    stage: &mut RenderStage,
) -> RenderResult<AccessUrl> {
    *stage = RenderStage::Fetch;
    let timer = Instant::now();
    let source_path = workspace.source_path();
    let source_bytes = ctx
        .store
        .download_file(&keys.source, &source_path)
        .await
        .map_err(RenderError::Fetch)?;
    finish_stage(logger, RenderStage::Fetch, timer);

    *stage = RenderStage::Synthesize;
    let timer = Instant::now();
    let options = SynthesisOptions {
        parallelism: ctx.config.frame_copy_parallelism,
        max_total_bytes: Some(ctx.config.workspace_limit_bytes.saturating_sub(source_bytes)),
    };
    let frames = synthesize_frames(
        &source_path,
        workspace.frames_dir(),
        request.frame_count,
        &options,
    )
    .await
    .map_err(RenderError::Synthesis)?;
    metrics::record_frames(frames.count());
    finish_stage(logger, RenderStage::Synthesize, timer);

    *stage = RenderStage::Encode;
    let timer = Instant::now();
    let spec = EncodeSpec::new(frames, workspace.output_path())
        .with_encoding(ctx.config.encoding.clone())
        .with_watermark(ctx.config.watermark())
        .with_audio(request.music_url().map(str::to_string));
    let video_path = ctx.encoder.run(&spec).await.map_err(RenderError::Encode)?;
    finish_stage(logger, RenderStage::Encode, timer);

    *stage = RenderStage::Publish;
    let timer = Instant::now();
    ctx.store
        .upload_file(&video_path, &keys.output, OUTPUT_CONTENT_TYPE)
        .await
        .map_err(RenderError::Publish)?;
    let access = grant_access(ctx.store.as_ref(), &keys.output, &ctx.config.access_policy)
        .await
        .map_err(RenderError::Publish)?;
    finish_stage(logger, RenderStage::Publish, timer);

    Ok(access)
}

fn finish_stage(logger: &JobLogger, stage: RenderStage, started: Instant) {
    let elapsed = started.elapsed();
    logger.log_stage(stage, elapsed);
    metrics::record_stage_duration(stage, elapsed);
}

/// Delete the consumed source snapshot.
///
/// Callers log and discard the result; a leftover source never fails a
/// render that already published its video.
pub async fn best_effort_delete_source(store: &dyn ObjectStore, key: &str) -> StorageResult<()> {
    debug!("Deleting consumed source {}", key);
    store.delete_object(key).await
}
