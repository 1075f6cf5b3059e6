//! Append-only snapshot storage.

use async_trait::async_trait;
use uuid::Uuid;

use versa_core::result::AppResult;
use versa_core::types::HistoryPage;
use versa_entity::kind::EntityKind;
use versa_entity::snapshot::{NewSnapshot, Snapshot, SnapshotLabels, VersionStats};

/// Store of immutable snapshot rows keyed by `(entity_kind, entity_id, version)`.
///
/// Implementations must enforce uniqueness of that key atomically and
/// report a duplicate insert as [`ErrorKind::Conflict`]; the version
/// allocator relies on it to detect lost races.
///
/// [`ErrorKind::Conflict`]: versa_core::ErrorKind::Conflict
#[async_trait]
pub trait SnapshotRepository: Send + Sync + 'static {
    /// Insert a new snapshot row.
    async fn insert(&self, snapshot: &NewSnapshot) -> AppResult<Snapshot>;

    /// Find a snapshot by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Snapshot>>;

    /// Find a specific version of an entity.
    async fn find_version(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        version: i32,
    ) -> AppResult<Option<Snapshot>>;

    /// Find the highest-numbered snapshot of an entity.
    async fn find_latest(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<Option<Snapshot>>;

    /// List snapshots of an entity, newest first.
    async fn list(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        page: HistoryPage,
    ) -> AppResult<Vec<Snapshot>>;

    /// List snapshots of an entity carrying `tag`, newest first.
    async fn find_by_tag(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        tag: &str,
    ) -> AppResult<Vec<Snapshot>>;

    /// Count snapshots of an entity.
    async fn count(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<u64>;

    /// Aggregate statistics over an entity's snapshots.
    async fn stats(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<VersionStats>;

    /// Change the mutable annotations of a snapshot.
    async fn update_labels(&self, id: Uuid, labels: &SnapshotLabels) -> AppResult<Snapshot>;

    /// Delete a snapshot. Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}
