//! Material repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{MySql, QueryBuilder};
use tracing::{debug, info};

use filebox_models::{Material, MaterialId, MaterialPatch};

use crate::error::{DbError, DbResult};
use crate::models::{MaterialDbModel, MATERIAL_TABLE};

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// MySQL connection URL
    pub database_url: String,
    /// Pool size
    pub max_connections: u32,
}

impl DbConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DbResult<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| DbError::config_error("DATABASE_URL not set"))?,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        })
    }
}

/// Material data access used by the thumbnail pipeline.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Find a live (not soft-deleted) material by ID.
    async fn find_by_id(&self, id: MaterialId) -> DbResult<Option<Material>>;

    /// Write only the fields set in `patch`.
    ///
    /// Fails with [`DbError::NotFound`] when no live row has this ID.
    async fn update_partial(&self, id: MaterialId, patch: &MaterialPatch) -> DbResult<()>;
}

/// SQLx implementation of MaterialRepository.
pub struct SqlxMaterialRepository {
    pool: MySqlPool,
}

impl SqlxMaterialRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        info!("Connected to database (pool size {})", config.max_connections);
        Ok(Self::new(pool))
    }
}

/// Build the partial UPDATE for `patch`. Returns `None` when there is
/// nothing to write.
fn build_update(
    id: MaterialId,
    patch: &MaterialPatch,
    now: DateTime<Utc>,
) -> Option<QueryBuilder<'static, MySql>> {
    if patch.is_empty() {
        return None;
    }

    let mut query = QueryBuilder::new(format!("UPDATE {} SET updated_at = ", MATERIAL_TABLE));
    query.push_bind(now);

    if let Some(ref cover) = patch.cover_oss_file_path {
        query.push(", cover_oss_file_path = ");
        query.push_bind(cover.clone());
    }

    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(" AND deleted_at IS NULL");
    Some(query)
}

#[async_trait]
impl MaterialRepository for SqlxMaterialRepository {
    async fn find_by_id(&self, id: MaterialId) -> DbResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialDbModel>(&format!(
            r#"
            SELECT id, user_id, file_name, file_ext, file_size, content_type,
                   oss_bucket, oss_file_path, cover_oss_file_path,
                   created_at, updated_at, deleted_at
            FROM {}
            WHERE id = ? AND deleted_at IS NULL
            "#,
            MATERIAL_TABLE
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Material::from))
    }

    async fn update_partial(&self, id: MaterialId, patch: &MaterialPatch) -> DbResult<()> {
        let Some(mut query) = build_update(id, patch, Utc::now()) else {
            debug!(material_id = id, "Empty patch, nothing to update");
            return Ok(());
        };

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(id));
        }

        debug!(material_id = id, "Updated material");
        Ok(())
    }
}
