//! End-to-end tests of the render pipeline with in-memory storage and a fake
//! encoder.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reel_media::{EncodeSpec, Encoder, MediaError, MediaResult};
use reel_models::{Caller, RenderRequest};
use reel_pipeline::{assemble_video, AppContext, PipelineConfig, RenderError, RenderStage};
use reel_storage::{AccessPolicy, MemoryStore, StoreOperation};
use tempfile::TempDir;

const SOURCE_KEY: &str = "canvases/canvas1/canvas.jpg";

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// What the encoder saw when it was invoked.
#[derive(Debug, Clone)]
struct EncodeCall {
    args: Vec<String>,
    input_count: usize,
    frames_on_disk: Vec<String>,
    expected_frames: Vec<PathBuf>,
    workspace: PathBuf,
}

struct FakeEncoder {
    behavior: Behavior,
    calls: Mutex<Vec<EncodeCall>>,
}

impl FakeEncoder {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn run(&self, spec: &EncodeSpec) -> MediaResult<PathBuf> {
        let cmd = spec.to_command();
        self.calls.lock().unwrap().push(EncodeCall {
            args: cmd.build_args(),
            input_count: cmd.input_count(),
            frames_on_disk: list_names(spec.frames.dir()),
            expected_frames: spec.frames.paths().collect(),
            workspace: spec.output.parent().unwrap().to_path_buf(),
        });

        match self.behavior {
            Behavior::Succeed => {
                tokio::fs::write(&spec.output, b"fake-mp4").await?;
                Ok(spec.output.clone())
            }
            Behavior::Fail => Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some("Invalid data found when processing input".to_string()),
                Some(1),
            )),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(MediaError::internal("unreachable"))
            }
        }
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    encoder: Arc<FakeEncoder>,
    ctx: AppContext,
    work_dir: TempDir,
}

impl Harness {
    fn new(behavior: Behavior) -> Self {
        Self::with_config(behavior, |_| {})
    }

    fn with_config(behavior: Behavior, tweak: impl FnOnce(&mut PipelineConfig)) -> Self {
        let work_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.insert(SOURCE_KEY, b"jpeg-bytes".to_vec(), "image/jpeg");
        let encoder = FakeEncoder::new(behavior);

        let mut config = PipelineConfig {
            work_dir: work_dir.path().to_path_buf(),
            access_policy: AccessPolicy::from_secs(3600),
            ..Default::default()
        };
        tweak(&mut config);

        let ctx = AppContext::new(store.clone(), encoder.clone(), config).unwrap();
        Self {
            store,
            encoder,
            ctx,
            work_dir,
        }
    }

    fn work_dir_entries(&self) -> Vec<String> {
        list_names(self.work_dir.path())
    }
}

fn caller() -> Caller {
    Caller::new("user-1")
}

#[tokio::test]
async fn unauthenticated_call_touches_nothing() {
    let h = Harness::new(Behavior::Succeed);
    let request = RenderRequest::new("canvas1", 30);

    let err = assemble_video(&h.ctx, None, &request).await.unwrap_err();

    assert!(matches!(err, RenderError::Unauthenticated));
    assert_eq!(err.stage(), RenderStage::Auth);
    assert_eq!(h.store.download_count(), 0);
    assert_eq!(h.store.upload_count(), 0);
    assert!(h.encoder.calls().is_empty());
    assert!(h.work_dir_entries().is_empty());
}

#[tokio::test]
async fn invalid_request_is_rejected_before_io() {
    let h = Harness::new(Behavior::Succeed);

    for request in [
        RenderRequest::new("canvas1", 0),
        RenderRequest::new("../etc", 10),
        RenderRequest::new("canvas1", 10).with_music("ftp://example.com/a.mp3"),
    ] {
        let err = assemble_video(&h.ctx, Some(&caller()), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)), "{:?}", err);
    }
    assert_eq!(h.store.download_count(), 0);
}

#[tokio::test]
async fn encoder_receives_every_frame_in_sequence() {
    let h = Harness::new(Behavior::Succeed);
    let request = RenderRequest::new("canvas1", 45);

    assemble_video(&h.ctx, Some(&caller()), &request).await.unwrap();

    let calls = h.encoder.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.frames_on_disk.len(), 45);
    assert_eq!(call.expected_frames.len(), 45);
    let expected: Vec<String> = (1..=45).map(|i| format!("frame_{:04}.jpg", i)).collect();
    assert_eq!(call.frames_on_disk, expected);
}

#[tokio::test]
async fn encode_uses_fixed_policy() {
    let h = Harness::new(Behavior::Succeed);
    assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 3))
        .await
        .unwrap();

    let args = h.encoder.calls()[0].args.join(" ");
    assert!(args.contains("-framerate 30"));
    assert!(args.contains("scale=350:622"));
    assert!(args.contains("-c:v libx264"));
    assert!(args.contains("-pix_fmt yuv420p"));
    assert!(args.contains("text='made with reel'"));
    assert!(args.contains("x=w-tw-20:y=h-th-20"));
}

#[tokio::test]
async fn audio_flags_follow_music_url() {
    let without = Harness::new(Behavior::Succeed);
    assemble_video(&without.ctx, Some(&caller()), &RenderRequest::new("canvas1", 3))
        .await
        .unwrap();
    let calls = without.encoder.calls();
    let call = &calls[0];
    assert_eq!(call.input_count, 1);
    assert!(!call.args.contains(&"-shortest".to_string()));

    let with = Harness::new(Behavior::Succeed);
    let request = RenderRequest::new("canvas1", 3).with_music("https://cdn.example.com/song.mp3");
    assemble_video(&with.ctx, Some(&caller()), &request).await.unwrap();
    let calls = with.encoder.calls();
    let call = &calls[0];
    assert_eq!(call.input_count, 2);
    assert!(call.args.contains(&"-shortest".to_string()));
    assert!(call.args.contains(&"https://cdn.example.com/song.mp3".to_string()));
}

#[tokio::test]
async fn success_publishes_and_grants_access() {
    let h = Harness::new(Behavior::Succeed);
    let before = Utc::now();

    let output = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 10))
        .await
        .unwrap();

    assert!(output.video_key.starts_with("canvases/canvas1/final_"));
    assert!(output.video_key.ends_with(".mp4"));
    let published = h.store.get(&output.video_key).unwrap();
    assert_eq!(published.content_type, "video/mp4");
    assert_eq!(published.data, b"fake-mp4");

    assert_eq!(
        h.store.key_for_url(output.video_url()).as_deref(),
        Some(output.video_key.as_str())
    );
    assert!(output.video_url().starts_with("https://"));
    assert_eq!(output.access.expires_in_secs, 3600);
    assert!(output.access.expires_at > Utc::now());
    assert!(output.access.expires_at >= before + chrono::Duration::seconds(3600));

    // Source consumed, working area gone.
    assert!(!h.store.contains(SOURCE_KEY));
    assert!(h.work_dir_entries().is_empty());
    assert!(!h.encoder.calls()[0].workspace.exists());
}

#[tokio::test]
async fn source_delete_failure_does_not_fail_render() {
    let h = Harness::new(Behavior::Succeed);
    h.store.fail(StoreOperation::Delete);

    let output = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 2))
        .await
        .unwrap();

    assert!(h.store.contains(&output.video_key));
    assert!(h.store.contains(SOURCE_KEY));
    assert_eq!(h.store.delete_count(), 1);
}

#[tokio::test]
async fn source_kept_when_deletion_disabled() {
    let h = Harness::with_config(Behavior::Succeed, |c| c.delete_source = false);
    assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 2))
        .await
        .unwrap();
    assert!(h.store.contains(SOURCE_KEY));
    assert_eq!(h.store.delete_count(), 0);
}

#[tokio::test]
async fn missing_source_fails_fetch() {
    let h = Harness::new(Behavior::Succeed);
    let err = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("other", 5))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), RenderStage::Fetch);
    assert!(!err.is_retryable());
    assert!(h.encoder.calls().is_empty());
    assert!(h.work_dir_entries().is_empty());
}

#[tokio::test]
async fn encode_failure_cleans_up_working_area() {
    let h = Harness::new(Behavior::Fail);
    let err = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 20))
        .await
        .unwrap_err();

    assert!(matches!(err, RenderError::Encode(_)));
    let calls = h.encoder.calls();
    let workspace = &calls[0].workspace;
    assert!(!workspace.exists());
    assert!(h.work_dir_entries().is_empty());
    assert_eq!(h.store.upload_count(), 0);
    assert!(h.store.contains(SOURCE_KEY));
}

#[tokio::test]
async fn publish_failure_cleans_up_and_keeps_source() {
    let h = Harness::new(Behavior::Succeed);
    h.store.fail(StoreOperation::Upload);

    let err = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 4))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), RenderStage::Publish);
    assert!(err.is_retryable());
    assert!(h.work_dir_entries().is_empty());
    assert!(h.store.contains(SOURCE_KEY));
}

#[tokio::test]
async fn workspace_budget_is_enforced() {
    // 10-byte source, 100 frames, 500-byte ceiling.
    let h = Harness::with_config(Behavior::Succeed, |c| c.workspace_limit_bytes = 500);
    let err = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 100))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), RenderStage::Synthesize);
    assert!(matches!(
        err,
        RenderError::Synthesis(MediaError::ResourceLimit(_))
    ));
    assert!(h.encoder.calls().is_empty());
    assert!(h.work_dir_entries().is_empty());
}

#[tokio::test]
async fn hung_encode_times_out_and_cleans_up() {
    let h = Harness::with_config(Behavior::Hang, |c| {
        c.job_timeout = Duration::from_millis(200)
    });

    let err = assemble_video(&h.ctx, Some(&caller()), &RenderRequest::new("canvas1", 5))
        .await
        .unwrap_err();

    match err {
        RenderError::Timeout { interrupted, .. } => assert_eq!(interrupted, RenderStage::Encode),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(h.work_dir_entries().is_empty());
    assert_eq!(h.store.upload_count(), 0);
}

#[tokio::test]
async fn concurrent_jobs_for_same_canvas_do_not_collide() {
    let h = Harness::with_config(Behavior::Succeed, |c| c.delete_source = false);
    let request = RenderRequest::new("canvas1", 8);
    let user = caller();

    let (a, b) = tokio::join!(
        assemble_video(&h.ctx, Some(&user), &request),
        assemble_video(&h.ctx, Some(&user), &request)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.job_id, b.job_id);
    assert_ne!(a.video_key, b.video_key);
    assert_ne!(a.video_url(), b.video_url());
    assert!(h.store.contains(&a.video_key));
    assert!(h.store.contains(&b.video_key));
    let calls = h.encoder.calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].workspace, calls[1].workspace);
    assert!(calls.iter().all(|c| c.frames_on_disk.len() == 8));
}
