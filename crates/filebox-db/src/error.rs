//! Database error types.

use thiserror::Error;

use filebox_models::MaterialId;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Material not found: {0}")]
    NotFound(MaterialId),

    #[error("Update failed: {0}")]
    UpdateFailed(String),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn update_failed(msg: impl Into<String>) -> Self {
        Self::UpdateFailed(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_) | DbError::Sqlx(sqlx::Error::RowNotFound))
    }
}
