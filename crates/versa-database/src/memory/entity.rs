//! In-memory live entity store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use versa_core::error::AppError;
use versa_core::result::AppResult;
use versa_entity::fields::{FieldSet, VersionedEntity};

use crate::traits::EntityStore;

/// Live entities of one kind held in a mutex-protected map.
#[derive(Debug, Clone)]
pub struct MemoryEntityStore<E: VersionedEntity> {
    rows: Arc<Mutex<HashMap<Uuid, E>>>,
}

impl<E: VersionedEntity> Default for MemoryEntityStore<E> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<E: VersionedEntity> MemoryEntityStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity, as the host application would on a
    /// normal create or edit.
    pub async fn put(&self, entity: E) {
        self.rows.lock().await.insert(entity.id(), entity);
    }

    /// Apply an in-place edit to an entity.
    pub async fn edit<F>(&self, id: Uuid, f: F) -> AppResult<E>
    where
        F: FnOnce(&mut E) + Send,
    {
        let mut rows = self.rows.lock().await;
        let entity = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", E::KIND)))?;
        f(entity);
        Ok(entity.clone())
    }

    /// Read an entity.
    pub async fn get(&self, id: Uuid) -> Option<E> {
        self.rows.lock().await.get(&id).cloned()
    }
}

#[async_trait]
impl<E: VersionedEntity> EntityStore<E> for MemoryEntityStore<E> {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>> {
        Ok(self.get(id).await)
    }

    async fn write_fields(&self, id: Uuid, fields: &FieldSet, actor_id: i64) -> AppResult<E> {
        let mut rows = self.rows.lock().await;
        let entity = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", E::KIND)))?;

        let mut updated = entity.clone();
        updated.restore(fields)?;
        updated.touch(actor_id, Utc::now());
        *entity = updated.clone();
        Ok(updated)
    }

    async fn advance_version(&self, id: Uuid, version: i32) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let entity = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", E::KIND)))?;
        if version > entity.current_version() {
            entity.set_current_version(version);
        }
        Ok(())
    }
}
