//! Task payload encoding.
//!
//! Both adapters store tasks as JSON strings so a payload written by one
//! process can be read by any other.

use filebox_models::ThumbnailTask;

use crate::error::{QueueError, QueueResult};

/// Serialize a task for the queue.
pub fn encode_task(task: &ThumbnailTask) -> QueueResult<String> {
    Ok(serde_json::to_string(task)?)
}

/// Parse a payload popped from the queue.
///
/// A payload that parses but carries an empty bucket or key is rejected
/// like any other undecodable payload.
pub fn decode_task(payload: &str) -> QueueResult<ThumbnailTask> {
    let task: ThumbnailTask =
        serde_json::from_str(payload).map_err(|source| QueueError::MalformedPayload {
            payload: payload.to_string(),
            source,
        })?;
    task.validate().map_err(|source| QueueError::InvalidPayload {
        payload: payload.to_string(),
        source,
    })?;
    Ok(task)
}
