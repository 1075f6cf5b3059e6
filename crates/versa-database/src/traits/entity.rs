//! Live entity storage.

use async_trait::async_trait;
use uuid::Uuid;

use versa_core::result::AppResult;
use versa_entity::fields::{FieldSet, VersionedEntity};

/// The host application's row store for one kind of live entity.
#[async_trait]
pub trait EntityStore<E: VersionedEntity>: Send + Sync + 'static {
    /// Find an entity by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<E>>;

    /// Overwrite the tracked fields of an entity and stamp the modifier.
    ///
    /// The read-modify-write must be atomic with respect to other writers
    /// of the same row.
    async fn write_fields(&self, id: Uuid, fields: &FieldSet, actor_id: i64) -> AppResult<E>;

    /// Raise the entity's version pointer to `version`. Never lowers it.
    async fn advance_version(&self, id: Uuid, version: i32) -> AppResult<()>;
}
