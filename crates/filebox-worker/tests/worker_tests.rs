//! End-to-end worker tests against the in-memory adapters.
//!
//! The fake transcoder is scripted by the source bytes it receives:
//! `CRASH` panics, `GARBAGE` fails like a rejected input, `EMPTY` exits
//! cleanly without writing output. Anything else yields a thumbnail.

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use filebox_db::MemoryMaterialRepository;
use filebox_media::{MediaError, MediaResult, Transcoder};
use filebox_models::{Material, MediaKind, ThumbnailTask};
use filebox_queue::{MemoryTaskQueue, TaskQueue, ThumbnailProducer};
use filebox_storage::{MemoryObjectStore, ObjectReader, ObjectStore, StorageResult};
use filebox_worker::{
    ErrorKind, LoopStep, PipelineStage, TaskOutcome, ThumbnailPipeline, ThumbnailWorker,
    WorkerConfig,
};

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";
const THUMB_BYTES: &[u8] = b"\xff\xd8\xfffake-jpeg";

#[derive(Default)]
struct FakeTranscoder {
    calls: Mutex<Vec<(MediaKind, Vec<u8>)>>,
}

impl FakeTranscoder {
    fn calls(&self) -> Vec<(MediaKind, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, kind: MediaKind, input: &Path, output: &Path) -> MediaResult<()> {
        let source = std::fs::read(input)?;
        self.calls.lock().unwrap().push((kind, source.clone()));

        match source.as_slice() {
            b"CRASH" => panic!("transcoder crashed"),
            b"GARBAGE" => {
                std::fs::write(output, b"partial")?;
                Err(MediaError::ffmpeg_failed(
                    "FFmpeg exited with code 1",
                    "Invalid data found when processing input",
                    Some(1),
                ))
            }
            b"EMPTY" => Err(MediaError::OutputMissing(output.to_path_buf())),
            _ => {
                std::fs::write(output, THUMB_BYTES)?;
                Ok(())
            }
        }
    }
}

/// Reader that fails as if the connection dropped.
struct ResetReader;

impl AsyncRead for ResetReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset mid-stream",
        )))
    }
}

/// Store whose objects stream a few bytes and then break.
struct BrokenStreamStore;

#[async_trait]
impl ObjectStore for BrokenStreamStore {
    async fn get_object(&self, _bucket: &str, _key: &str) -> StorageResult<ObjectReader> {
        Ok(Box::pin((&b"partial bytes"[..]).chain(ResetReader)))
    }

    async fn put_object(
        &self,
        _bucket: &str,
        _key: &str,
        _body: ObjectReader,
        _size: u64,
        _content_type: &str,
    ) -> StorageResult<()> {
        Ok(())
    }

    async fn exists(&self, _bucket: &str, _key: &str) -> StorageResult<bool> {
        Ok(true)
    }
}

struct Harness {
    queue: Arc<MemoryTaskQueue>,
    store: Arc<MemoryObjectStore>,
    repo: Arc<MemoryMaterialRepository>,
    transcoder: Arc<FakeTranscoder>,
    scratch: TempDir,
    worker: Arc<ThumbnailWorker>,
}

impl Harness {
    fn new() -> Self {
        Self::with_pop_timeout(Duration::from_secs(5))
    }

    fn with_pop_timeout(pop_timeout: Duration) -> Self {
        let queue = Arc::new(MemoryTaskQueue::new());
        let store = Arc::new(MemoryObjectStore::new());
        let repo = Arc::new(MemoryMaterialRepository::new());
        let transcoder = Arc::new(FakeTranscoder::default());
        let scratch = TempDir::new().unwrap();

        let config = WorkerConfig {
            pop_timeout,
            scratch_dir: scratch.path().to_path_buf(),
            ..WorkerConfig::default()
        };
        let pipeline = Arc::new(ThumbnailPipeline::new(
            store.clone(),
            repo.clone(),
            transcoder.clone(),
            scratch.path(),
        ));
        let worker = Arc::new(ThumbnailWorker::new(config, queue.clone(), pipeline));

        Self {
            queue,
            store,
            repo,
            transcoder,
            scratch,
            worker,
        }
    }

    async fn push(&self, material_id: u64, key: &str, content_type: &str) {
        self.queue
            .push(&ThumbnailTask::new(material_id, "b", key, content_type))
            .await
            .unwrap();
    }

    async fn cover(&self, id: u64) -> Option<String> {
        self.repo.get(id).await.unwrap().cover_oss_file_path
    }

    fn scratch_entries(&self) -> Vec<String> {
        std::fs::read_dir(self.scratch.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

fn material(id: u64, key: &str) -> Material {
    let now = Utc::now();
    Material {
        id,
        user_id: 7,
        file_name: "1.png".to_string(),
        file_ext: "png".to_string(),
        file_size: PNG_BYTES.len() as i64,
        content_type: Some("image/png".to_string()),
        oss_bucket: "b".to_string(),
        oss_file_path: key.to_string(),
        cover_oss_file_path: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn expect_failed(step: LoopStep) -> (PipelineStage, ErrorKind) {
    match step {
        LoopStep::Processed(TaskOutcome::Failed { stage, kind, .. }) => (stage, kind),
        other => panic!("expected failed task, got {:?}", other),
    }
}

#[tokio::test]
async fn test_image_task_sets_cover() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;

    let producer = ThumbnailProducer::new(h.queue.clone());
    producer
        .enqueue(42, "b", "u/42/1.png", "image/png")
        .await
        .unwrap();

    let step = h.worker.tick().await;
    assert_eq!(
        step,
        LoopStep::Processed(TaskOutcome::Completed {
            thumb_key: "u/42/1.png.thumb.jpg".to_string()
        })
    );

    let thumb = h.store.get("b", "u/42/1.png.thumb.jpg").await.unwrap();
    assert_eq!(thumb.data, THUMB_BYTES);
    assert_eq!(thumb.content_type, "image/jpeg");
    assert_eq!(h.cover(42).await.as_deref(), Some("u/42/1.png.thumb.jpg"));

    let calls = h.transcoder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, MediaKind::Image);
    assert_eq!(calls[0].1, PNG_BYTES);

    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_missing_source_aborts_at_fetch() {
    let h = Harness::new();
    let mut existing = material(42, "u/42/1.png");
    existing.cover_oss_file_path = Some("u/42/old.png.thumb.jpg".to_string());
    h.repo.insert(existing).await;
    h.push(42, "u/42/missing.png", "image/png").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Fetch);
    assert_eq!(kind, ErrorKind::NotFound);

    assert_eq!(h.cover(42).await.as_deref(), Some("u/42/old.png.thumb.jpg"));
    assert!(h.transcoder.calls().is_empty());
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_missing_material_leaves_orphan_thumbnail() {
    let h = Harness::new();
    h.store.insert("b", "u/9/1.png", PNG_BYTES, "image/png").await;
    h.push(9, "u/9/1.png", "image/png").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Persist);
    assert_eq!(kind, ErrorKind::NotFound);

    assert!(h.store.get("b", "u/9/1.png.thumb.jpg").await.is_some());
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_soft_deleted_material_is_not_updated() {
    let h = Harness::new();
    let mut deleted = material(42, "u/42/1.png");
    deleted.deleted_at = Some(Utc::now());
    h.repo.insert(deleted).await;
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;
    h.push(42, "u/42/1.png", "image/png").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Persist);
    assert_eq!(kind, ErrorKind::NotFound);
    assert!(h.cover(42).await.is_none());
}

#[tokio::test]
async fn test_upload_failure_leaves_cover_unchanged() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;
    h.store.set_fail_uploads(true);
    h.push(42, "u/42/1.png", "image/png").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Upload);
    assert_eq!(kind, ErrorKind::Transport);

    assert!(h.cover(42).await.is_none());
    assert!(h.store.get("b", "u/42/1.png.thumb.jpg").await.is_none());
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_persist_failure_reports_transport() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.repo.set_fail_updates(true);
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;
    h.push(42, "u/42/1.png", "image/png").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Persist);
    assert_eq!(kind, ErrorKind::Transport);
    assert!(h.cover(42).await.is_none());
}

#[tokio::test]
async fn test_transcoder_failure_removes_partial_output() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.store.insert("b", "u/42/1.png", "GARBAGE", "image/png").await;
    h.push(42, "u/42/1.png", "image/png").await;

    match h.worker.tick().await {
        LoopStep::Processed(TaskOutcome::Failed { stage, kind, error }) => {
            assert_eq!(stage, PipelineStage::Transcode);
            assert_eq!(kind, ErrorKind::ExternalProcess);
            assert!(error.contains("FFmpeg"));
        }
        other => panic!("expected transcode failure, got {:?}", other),
    }

    assert!(h.cover(42).await.is_none());
    assert_eq!(h.store.len().await, 1);
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_missing_transcoder_output_fails_task() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.mp4")).await;
    h.store.insert("b", "u/42/1.mp4", "EMPTY", "video/mp4").await;
    h.push(42, "u/42/1.mp4", "video/mp4").await;

    let (stage, kind) = expect_failed(h.worker.tick().await);
    assert_eq!(stage, PipelineStage::Transcode);
    assert_eq!(kind, ErrorKind::ExternalProcess);
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_content_type_selects_transcode_path() {
    let h = Harness::new();
    for (id, key, content_type) in [
        (1, "u/1/a.mp4", "video/mp4"),
        (2, "u/2/b", ""),
        (3, "u/3/c.pdf", "application/pdf"),
        (4, "u/4/d.webp", "image/webp"),
    ] {
        h.repo.insert(material(id, key)).await;
        h.store.insert("b", key, PNG_BYTES, content_type).await;
        h.push(id, key, content_type).await;
    }

    for _ in 0..4 {
        assert!(matches!(
            h.worker.tick().await,
            LoopStep::Processed(TaskOutcome::Completed { .. })
        ));
    }

    let kinds: Vec<MediaKind> = h.transcoder.calls().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![
            MediaKind::Video,
            MediaKind::Video,
            MediaKind::Video,
            MediaKind::Image
        ]
    );
    assert_eq!(h.cover(2).await.as_deref(), Some("u/2/b.thumb.jpg"));
}

#[tokio::test]
async fn test_malformed_payload_is_dropped() {
    let h = Harness::new();
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;
    h.queue.push_raw("{not json").await;
    h.push(42, "u/42/1.png", "image/png").await;

    assert_eq!(h.worker.tick().await, LoopStep::Dropped);
    assert!(matches!(
        h.worker.tick().await,
        LoopStep::Processed(TaskOutcome::Completed { .. })
    ));
    assert_eq!(h.queue.len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_bucket_or_key_is_dropped() {
    let h = Harness::new();
    h.repo.insert(material(1, "u/1/a.png")).await;
    h.queue
        .push_raw(r#"{"material_id":1,"bucket":"","key":"u/1/a.png","content_type":"image/png"}"#)
        .await;
    h.queue
        .push_raw(r#"{"material_id":1,"bucket":"b","key":"","content_type":"image/png"}"#)
        .await;
    h.queue.push_raw(r#"{"material_id":1,"bucket":"","key":""}"#).await;

    for _ in 0..3 {
        assert_eq!(h.worker.tick().await, LoopStep::Dropped);
    }

    assert!(h.transcoder.calls().is_empty());
    assert!(h.cover(1).await.is_none());
    assert_eq!(h.store.len().await, 0);
    assert!(h.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_broken_source_stream_removes_partial_file() {
    let scratch = TempDir::new().unwrap();
    let queue = Arc::new(MemoryTaskQueue::new());
    let repo = Arc::new(MemoryMaterialRepository::new());
    let transcoder = Arc::new(FakeTranscoder::default());
    repo.insert(material(42, "u/42/1.png")).await;

    let pipeline = Arc::new(ThumbnailPipeline::new(
        Arc::new(BrokenStreamStore),
        repo.clone(),
        transcoder.clone(),
        scratch.path(),
    ));
    let config = WorkerConfig {
        scratch_dir: scratch.path().to_path_buf(),
        ..WorkerConfig::default()
    };
    let worker = ThumbnailWorker::new(config, queue.clone(), pipeline);

    queue
        .push(&ThumbnailTask::new(42, "b", "u/42/1.png", "image/png"))
        .await
        .unwrap();

    match worker.tick().await {
        LoopStep::Processed(TaskOutcome::Failed { stage, kind, error }) => {
            assert_eq!(stage, PipelineStage::Materialize);
            assert_eq!(kind, ErrorKind::Transport);
            assert!(error.contains("connection reset"), "{error}");
        }
        other => panic!("expected materialize failure, got {:?}", other),
    }

    assert!(transcoder.calls().is_empty());
    assert!(repo.get(42).await.unwrap().cover_oss_file_path.is_none());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_panic_is_contained() {
    let h = Harness::new();
    h.repo.insert(material(1, "u/1/crash.png")).await;
    h.repo.insert(material(2, "u/2/ok.png")).await;
    h.store.insert("b", "u/1/crash.png", "CRASH", "image/png").await;
    h.store.insert("b", "u/2/ok.png", PNG_BYTES, "image/png").await;
    h.push(1, "u/1/crash.png", "image/png").await;
    h.push(2, "u/2/ok.png", "image/png").await;

    assert_eq!(h.worker.tick().await, LoopStep::Recovered);
    assert!(h.scratch_entries().is_empty());
    assert!(h.cover(1).await.is_none());

    assert!(matches!(
        h.worker.tick().await,
        LoopStep::Processed(TaskOutcome::Completed { .. })
    ));
    assert_eq!(h.cover(2).await.as_deref(), Some("u/2/ok.png.thumb.jpg"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_queue_is_idle_after_timeout() {
    let h = Harness::new();

    let start = tokio::time::Instant::now();
    assert_eq!(h.worker.tick().await, LoopStep::Idle);
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_backs_off() {
    let h = Harness::new();
    h.queue.set_unavailable(true);

    let start = tokio::time::Instant::now();
    assert_eq!(h.worker.tick().await, LoopStep::Backoff);
    assert!(start.elapsed() >= Duration::from_secs(5));

    h.queue.set_unavailable(false);
    h.repo.insert(material(42, "u/42/1.png")).await;
    h.store.insert("b", "u/42/1.png", PNG_BYTES, "image/png").await;
    h.push(42, "u/42/1.png", "image/png").await;
    assert!(matches!(
        h.worker.tick().await,
        LoopStep::Processed(TaskOutcome::Completed { .. })
    ));
}

#[tokio::test]
async fn test_run_drains_queue_past_failures() {
    let h = Harness::with_pop_timeout(Duration::from_millis(50));
    h.repo.insert(material(1, "u/1/crash.png")).await;
    h.repo.insert(material(2, "u/2/ok.png")).await;
    h.store.insert("b", "u/1/crash.png", "CRASH", "image/png").await;
    h.store.insert("b", "u/2/ok.png", PNG_BYTES, "image/png").await;

    h.queue.push_raw("garbage").await;
    h.push(1, "u/1/crash.png", "image/png").await;
    h.push(404, "u/404/missing.png", "image/png").await;
    h.push(2, "u/2/ok.png", "image/png").await;

    let worker = h.worker.clone();
    let handle = tokio::spawn(async move { worker.run().await });

    let done = tokio::time::timeout(Duration::from_secs(10), async {
        while h.cover(2).await.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    handle.abort();

    assert!(done.is_ok(), "worker did not process the last task");
    assert_eq!(h.queue.len().await.unwrap(), 0);
    assert!(h.scratch_entries().is_empty());
}
