//! Material records.
//!
//! A material is an uploaded file owned by a user. The thumbnail pipeline
//! only ever touches its cover pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Material primary key.
pub type MaterialId = u64;

/// Uploaded file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub user_id: u64,
    pub file_name: String,
    pub file_ext: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub oss_bucket: String,
    pub oss_file_path: String,
    /// Key of the derived thumbnail, set only after it was uploaded.
    pub cover_oss_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Partial update of a material.
///
/// Only fields that are `Some` are written; everything else on the row is
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_oss_file_path: Option<String>,
}

impl MaterialPatch {
    /// Patch that sets only the cover pointer.
    pub fn cover(path: impl Into<String>) -> Self {
        Self {
            cover_oss_file_path: Some(path.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cover_oss_file_path.is_none()
    }

    /// Apply the patch to an in-memory record.
    pub fn apply_to(&self, material: &mut Material) {
        if let Some(ref path) = self.cover_oss_file_path {
            material.cover_oss_file_path = Some(path.clone());
        }
    }
}
