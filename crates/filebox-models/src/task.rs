//! Thumbnail task envelope.
//!
//! The envelope is the only thing that travels through the queue. It carries
//! everything the worker needs and is never mutated after construction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::thumbnail_key;
use crate::material::MaterialId;
use crate::media::MediaKind;

/// Reasons a task envelope is rejected on enqueue or dequeue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("bucket must not be empty")]
    EmptyBucket,

    #[error("key must not be empty")]
    EmptyKey,
}

/// Job descriptor for deriving a thumbnail from a stored object.
///
/// Serialized as a flat JSON object:
/// `{"material_id":42,"bucket":"b","key":"u/42/1.png","content_type":"image/png"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThumbnailTask {
    material_id: MaterialId,
    bucket: String,
    key: String,
    #[serde(default)]
    content_type: String,
}

impl ThumbnailTask {
    /// Create a task. Use [`ThumbnailTask::validate`] before enqueueing.
    pub fn new(
        material_id: MaterialId,
        bucket: impl Into<String>,
        key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            material_id,
            bucket: bucket.into(),
            key: key.into(),
            content_type: content_type.into(),
        }
    }

    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// MIME hint supplied at upload time; may be empty.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Check the required fields.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.bucket.is_empty() {
            return Err(TaskValidationError::EmptyBucket);
        }
        if self.key.is_empty() {
            return Err(TaskValidationError::EmptyKey);
        }
        Ok(())
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type)
    }

    /// Key the derived thumbnail is uploaded under.
    pub fn thumbnail_key(&self) -> String {
        thumbnail_key(&self.key)
    }
}
