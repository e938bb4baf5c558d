//! In-memory material repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use filebox_models::{Material, MaterialId, MaterialPatch};

use crate::error::{DbError, DbResult};
use crate::repository::MaterialRepository;

#[derive(Default)]
pub struct MemoryMaterialRepository {
    rows: RwLock<HashMap<MaterialId, Material>>,
    fail_updates: AtomicBool,
}

impl MemoryMaterialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, material: Material) {
        self.rows.write().await.insert(material.id, material);
    }

    /// Raw row access, including soft-deleted rows.
    pub async fn get(&self, id: MaterialId) -> Option<Material> {
        self.rows.read().await.get(&id).cloned()
    }

    /// Make every subsequent update fail.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MaterialRepository for MemoryMaterialRepository {
    async fn find_by_id(&self, id: MaterialId) -> DbResult<Option<Material>> {
        Ok(self
            .rows
            .read()
            .await
            .get(&id)
            .filter(|m| m.deleted_at.is_none())
            .cloned())
    }

    async fn update_partial(&self, id: MaterialId, patch: &MaterialPatch) -> DbResult<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DbError::update_failed("injected update failure"));
        }
        if patch.is_empty() {
            return Ok(());
        }

        let mut rows = self.rows.write().await;
        let material = rows
            .get_mut(&id)
            .filter(|m| m.deleted_at.is_none())
            .ok_or(DbError::NotFound(id))?;

        patch.apply_to(material);
        material.updated_at = Utc::now();
        Ok(())
    }
}
