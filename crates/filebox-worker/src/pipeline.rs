//! Thumbnail derivation pipeline.
//!
//! One task runs through five stages in order:
//!
//! 1. **Fetch**: open the source object stream
//! 2. **Materialize**: copy it into a scratch file
//! 3. **Transcode**: run FFmpeg on the scratch file, choosing the image or
//!    video invocation from the content type
//! 4. **Upload**: store the thumbnail next to the source under `key + ".thumb.jpg"`
//! 5. **Persist**: point the owning material's cover at the uploaded key
//!
//! The first failing stage ends the task. Scratch files are held by
//! [`ScratchFile`] guards and removed on every exit path. The cover pointer
//! is written only after the upload returned success.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use filebox_db::MaterialRepository;
use filebox_media::{MediaError, ScratchFile, Transcoder};
use filebox_models::{MaterialPatch, ThumbnailTask, THUMBNAIL_CONTENT_TYPE, THUMBNAIL_SUFFIX};
use filebox_storage::{ObjectStore, StorageError};

use crate::error::{ErrorKind, WorkerError};
use crate::logging::TaskLogger;
use crate::metrics;

/// Prefix for downloaded source files in the scratch directory.
const SCRATCH_PREFIX: &str = "material-";

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Pipeline stage a task failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetch,
    Materialize,
    Transcode,
    Upload,
    Persist,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Materialize => "materialize",
            PipelineStage::Transcode => "transcode",
            PipelineStage::Upload => "upload",
            PipelineStage::Persist => "persist",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Thumbnail uploaded and cover pointer updated.
    Completed { thumb_key: String },
    /// Processing stopped at `stage`. The task is not retried.
    Failed {
        stage: PipelineStage,
        kind: ErrorKind,
        error: String,
    },
}

/// An error tagged with the stage that raised it.
struct StageError {
    stage: PipelineStage,
    error: WorkerError,
}

trait AtStage<T> {
    fn at(self, stage: PipelineStage) -> Result<T, StageError>;
}

impl<T, E: Into<WorkerError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: PipelineStage) -> Result<T, StageError> {
        self.map_err(|e| StageError {
            stage,
            error: e.into(),
        })
    }
}

/// Local filesystem failures while staging files are I/O, not process failures.
fn scratch_error(err: MediaError) -> WorkerError {
    match err {
        MediaError::Io(e) => WorkerError::Io(e),
        other => WorkerError::Media(other),
    }
}

/// Derives thumbnails for tasks popped from the queue.
pub struct ThumbnailPipeline {
    store: Arc<dyn ObjectStore>,
    repo: Arc<dyn MaterialRepository>,
    transcoder: Arc<dyn Transcoder>,
    scratch_dir: PathBuf,
}

impl ThumbnailPipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        repo: Arc<dyn MaterialRepository>,
        transcoder: Arc<dyn Transcoder>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            repo,
            transcoder,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Process one task to completion or to its first failure.
    ///
    /// Never returns an error: failures are logged with the task's identity
    /// and reported in the outcome.
    pub async fn process(&self, task: &ThumbnailTask) -> TaskOutcome {
        let logger = TaskLogger::new(task);
        logger.log_start(task.content_type());

        match self.run(task).await {
            Ok(thumb_key) => {
                logger.log_completion(&thumb_key);
                metrics::record_task(metrics::OUTCOME_COMPLETED);
                TaskOutcome::Completed { thumb_key }
            }
            Err(StageError { stage, error }) => {
                logger.log_failure(stage, &error);
                let kind = error.kind();
                metrics::record_task(kind.as_str());
                TaskOutcome::Failed {
                    stage,
                    kind,
                    error: error.to_string(),
                }
            }
        }
    }

    async fn run(&self, task: &ThumbnailTask) -> Result<String, StageError> {
        let mut reader = self
            .store
            .get_object(task.bucket(), task.key())
            .await
            .at(PipelineStage::Fetch)?;

        let source = ScratchFile::create_in(&self.scratch_dir, SCRATCH_PREFIX)
            .map_err(scratch_error)
            .at(PipelineStage::Materialize)?;
        {
            let mut file = tokio::fs::File::create(source.path())
                .await
                .at(PipelineStage::Materialize)?;
            let mut buf = vec![0u8; COPY_BUFFER_SIZE];
            loop {
                // A failed read is the object stream breaking, not the local disk.
                let n = reader
                    .read(&mut buf)
                    .await
                    .map_err(|e| StorageError::download_failed(e.to_string()))
                    .at(PipelineStage::Materialize)?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n])
                    .await
                    .at(PipelineStage::Materialize)?;
            }
            file.flush().await.at(PipelineStage::Materialize)?;
        }
        drop(reader);

        let thumb = source.sibling(THUMBNAIL_SUFFIX);
        self.transcoder
            .transcode(task.media_kind(), source.path(), thumb.path())
            .await
            .at(PipelineStage::Transcode)?;

        let thumb_key = task.thumbnail_key();
        let file = tokio::fs::File::open(thumb.path())
            .await
            .at(PipelineStage::Upload)?;
        let size = file.metadata().await.at(PipelineStage::Upload)?.len();
        self.store
            .put_object(
                task.bucket(),
                &thumb_key,
                Box::pin(file),
                size,
                THUMBNAIL_CONTENT_TYPE,
            )
            .await
            .at(PipelineStage::Upload)?;

        let material = self
            .repo
            .find_by_id(task.material_id())
            .await
            .at(PipelineStage::Persist)?
            .ok_or(WorkerError::MaterialNotFound(task.material_id()))
            .at(PipelineStage::Persist)?;
        self.repo
            .update_partial(material.id, &MaterialPatch::cover(thumb_key.clone()))
            .await
            .at(PipelineStage::Persist)?;

        Ok(thumb_key)
    }
}
