//! Queue error types.

use thiserror::Error;

use filebox_models::TaskValidationError;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Enqueue failed: {0}")]
    EnqueueFailed(String),

    #[error("Dequeue failed: {0}")]
    DequeueFailed(String),

    #[error("Invalid task: {0}")]
    InvalidTask(#[from] TaskValidationError),

    #[error("Malformed task payload {payload:?}: {source}")]
    MalformedPayload {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid task payload {payload:?}: {source}")]
    InvalidPayload {
        payload: String,
        #[source]
        source: TaskValidationError,
    },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn enqueue_failed(msg: impl Into<String>) -> Self {
        Self::EnqueueFailed(msg.into())
    }

    pub fn dequeue_failed(msg: impl Into<String>) -> Self {
        Self::DequeueFailed(msg.into())
    }

    /// True if the queue service could not be reached.
    ///
    /// Transport errors are worth waiting out; everything else concerns a
    /// single payload and is final for it.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QueueError::ConnectionFailed(_)
                | QueueError::EnqueueFailed(_)
                | QueueError::DequeueFailed(_)
                | QueueError::Redis(_)
        )
    }
}
