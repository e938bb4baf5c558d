//! Structured task logging.
//!
//! Every line carries the material ID, bucket and key so a dropped task can
//! be diagnosed from logs alone.

use tracing::{error, info, warn, Span};

use filebox_models::{MaterialId, ThumbnailTask};

use crate::error::WorkerError;
use crate::pipeline::PipelineStage;

/// Task logger with the task's identifying fields attached.
#[derive(Debug, Clone)]
pub struct TaskLogger {
    material_id: MaterialId,
    bucket: String,
    key: String,
}

impl TaskLogger {
    pub fn new(task: &ThumbnailTask) -> Self {
        Self {
            material_id: task.material_id(),
            bucket: task.bucket().to_string(),
            key: task.key().to_string(),
        }
    }

    pub fn log_start(&self, content_type: &str) {
        info!(
            material_id = self.material_id,
            bucket = %self.bucket,
            key = %self.key,
            content_type = %content_type,
            "Thumbnail task started"
        );
    }

    pub fn log_completion(&self, thumb_key: &str) {
        info!(
            material_id = self.material_id,
            bucket = %self.bucket,
            key = %self.key,
            thumb_key = %thumb_key,
            "Thumbnail task completed"
        );
    }

    /// Log a task-fatal error together with the stage it occurred in.
    pub fn log_failure(&self, stage: PipelineStage, err: &WorkerError) {
        match err.process_output() {
            Some(output) => error!(
                material_id = self.material_id,
                bucket = %self.bucket,
                key = %self.key,
                stage = %stage,
                kind = %err.kind(),
                output = %output,
                "Thumbnail task failed: {}", err
            ),
            None => error!(
                material_id = self.material_id,
                bucket = %self.bucket,
                key = %self.key,
                stage = %stage,
                kind = %err.kind(),
                "Thumbnail task failed: {}", err
            ),
        }
    }

    /// Log a pipeline run that panicked and was contained by the worker.
    pub fn log_panic(&self, message: &str) {
        error!(
            material_id = self.material_id,
            bucket = %self.bucket,
            key = %self.key,
            "Thumbnail task panicked: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            material_id = self.material_id,
            bucket = %self.bucket,
            key = %self.key,
            "Thumbnail task warning: {}", message
        );
    }

    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    /// Create a tracing span for this task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "thumbnail_task",
            material_id = self.material_id,
            bucket = %self.bucket,
            key = %self.key
        )
    }
}
