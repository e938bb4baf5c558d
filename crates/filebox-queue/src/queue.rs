//! Queue port and configuration.

use std::time::Duration;

use async_trait::async_trait;

use filebox_models::ThumbnailTask;

use crate::error::QueueResult;

/// Default Redis list holding pending thumbnail tasks.
pub const DEFAULT_QUEUE_NAME: &str = "thumbnail_tasks";

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// List name for thumbnail tasks
    pub queue_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            queue_name: std::env::var("THUMBNAIL_QUEUE")
                .unwrap_or_else(|_| DEFAULT_QUEUE_NAME.to_string()),
        }
    }
}

/// FIFO queue of thumbnail tasks.
///
/// There is no acknowledgment: a popped task is gone from the queue whether
/// or not it is processed successfully.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a task to the tail of the queue.
    async fn push(&self, task: &ThumbnailTask) -> QueueResult<()>;

    /// Remove the head task, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `Ok(None)` when the timeout elapses on an empty queue.
    /// A payload that cannot be decoded is consumed and reported as
    /// [`QueueError::MalformedPayload`](crate::QueueError::MalformedPayload).
    async fn pop_blocking(&self, timeout: Duration) -> QueueResult<Option<ThumbnailTask>>;

    /// Number of pending tasks.
    async fn len(&self) -> QueueResult<u64>;
}
