//! Thumbnail task producer.
//!
//! Called synchronously from the file-save path. Enqueueing is a one-way
//! send: the caller learns whether the push succeeded and nothing else.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use filebox_models::{MaterialId, ThumbnailTask};

use crate::error::QueueResult;
use crate::queue::TaskQueue;

pub const THUMBNAIL_ENQUEUED_TOTAL: &str = "filebox_thumbnail_enqueued_total";
pub const THUMBNAIL_ENQUEUE_FAILED_TOTAL: &str = "filebox_thumbnail_enqueue_failed_total";

/// Enqueues thumbnail derivation jobs.
#[derive(Clone)]
pub struct ThumbnailProducer {
    queue: Arc<dyn TaskQueue>,
}

impl ThumbnailProducer {
    pub fn new(queue: Arc<dyn TaskQueue>) -> Self {
        Self { queue }
    }

    /// Build a task and push it onto the queue.
    ///
    /// Re-saving the same object enqueues a second, independent task.
    pub async fn enqueue(
        &self,
        material_id: MaterialId,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> QueueResult<()> {
        let task = ThumbnailTask::new(material_id, bucket, key, content_type);
        task.validate()?;

        match self.queue.push(&task).await {
            Ok(()) => {
                counter!(THUMBNAIL_ENQUEUED_TOTAL).increment(1);
                debug!(material_id, bucket, key, "Enqueued thumbnail task");
                Ok(())
            }
            Err(e) => {
                counter!(THUMBNAIL_ENQUEUE_FAILED_TOTAL).increment(1);
                Err(e)
            }
        }
    }

    /// Enqueue and log a failure instead of returning it.
    ///
    /// For the save handler: losing the thumbnail job must not fail the save.
    /// Returns whether the task was queued.
    pub async fn enqueue_or_warn(
        &self,
        material_id: MaterialId,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> bool {
        match self.enqueue(material_id, bucket, key, content_type).await {
            Ok(()) => true,
            Err(e) => {
                warn!(material_id, bucket, key, "Failed to enqueue thumbnail task: {}", e);
                false
            }
        }
    }
}
