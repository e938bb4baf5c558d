//! Database row models.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use filebox_models::Material;

/// Table holding material records.
pub const MATERIAL_TABLE: &str = "godir_material";

/// Row of the material table.
#[derive(Debug, Clone, FromRow)]
pub struct MaterialDbModel {
    pub id: u64,
    pub user_id: u64,
    pub file_name: String,
    pub file_ext: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub oss_bucket: String,
    pub oss_file_path: String,
    pub cover_oss_file_path: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<MaterialDbModel> for Material {
    fn from(row: MaterialDbModel) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            file_name: row.file_name,
            file_ext: row.file_ext,
            file_size: row.file_size,
            content_type: row.content_type.filter(|ct| !ct.is_empty()),
            oss_bucket: row.oss_bucket,
            oss_file_path: row.oss_file_path,
            cover_oss_file_path: row.cover_oss_file_path.filter(|p| !p.is_empty()),
            created_at: row.created_at.unwrap_or_default(),
            updated_at: row.updated_at.unwrap_or_default(),
            deleted_at: row.deleted_at,
        }
    }
}
