//! Forward-only revert.
//!
//! A revert never rewrites history. It snapshots the current state, copies
//! the target's tracked fields onto the live entity, and snapshots the
//! result, so every revert grows the history by exactly two versions.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_core::traits::Service;
use versa_database::traits::{EntityStore, SnapshotRepository};
use versa_entity::fields::VersionedEntity;
use versa_entity::snapshot::Snapshot;

use super::snapshot::{SnapshotRequest, SnapshotService};

/// Label of the snapshot taken before a revert overwrites the entity.
pub const PRE_REVERT_LABEL: &str = "pre-revert";
/// Tag of the snapshot taken before a revert.
pub const PRE_REVERT_TAG: &str = "pre-revert";
/// Tag of the snapshot recording a reverted state.
pub const REVERTED_TAG: &str = "reverted";

/// The version a revert restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertTarget {
    /// A version number of the entity.
    Version(i32),
    /// A snapshot id, which must belong to the entity.
    Snapshot(Uuid),
}

/// Result of a completed revert.
#[derive(Debug, Clone)]
pub struct RevertOutcome<E> {
    /// The live entity after the revert.
    pub entity: E,
    /// Snapshot of the state that was overwritten.
    pub backup: Snapshot,
    /// Snapshot of the restored state.
    pub reverted: Snapshot,
}

/// Restores live entities to historical versions.
pub struct RevertService<E: VersionedEntity> {
    entities: Arc<dyn EntityStore<E>>,
    snapshots: Arc<dyn SnapshotRepository>,
    snapshot_service: SnapshotService<E>,
    /// One lock per entity with a revert in flight.
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<E: VersionedEntity> Clone for RevertService<E> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            snapshots: Arc::clone(&self.snapshots),
            snapshot_service: self.snapshot_service.clone(),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<E: VersionedEntity> Service for RevertService<E> {}

impl<E: VersionedEntity> RevertService<E> {
    /// Creates a new revert service.
    pub fn new(
        entities: Arc<dyn EntityStore<E>>,
        snapshots: Arc<dyn SnapshotRepository>,
        snapshot_service: SnapshotService<E>,
    ) -> Self {
        Self {
            entities,
            snapshots,
            snapshot_service,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Restore `entity_id` to `target`.
    ///
    /// Failures before the backup snapshot exists are returned as-is. Once
    /// the backup is durable, a failure is reported as
    /// [`ErrorKind::RevertIncomplete`] naming the step and the backup
    /// version; the backup is not rolled back.
    pub async fn revert(
        &self,
        entity_id: Uuid,
        target: RevertTarget,
        actor_id: i64,
        reason: Option<String>,
    ) -> AppResult<RevertOutcome<E>> {
        let slot = EntityLock::acquire(&self.locks, entity_id);
        let _held = slot.mutex().lock().await;
        self.revert_locked(entity_id, target, actor_id, reason).await
    }

    async fn revert_locked(
        &self,
        entity_id: Uuid,
        target: RevertTarget,
        actor_id: i64,
        reason: Option<String>,
    ) -> AppResult<RevertOutcome<E>> {
        let entity = self.snapshot_service.load_entity(entity_id).await?;
        let target = self.resolve_target(entity_id, target).await?;

        // Validated up front so a bad reason cannot fail step 3.
        let mut restored_request = SnapshotRequest::labeled(format!("reverted to v{}", target.version))
            .with_tags([REVERTED_TAG.to_string(), format!("from-v{}", target.version)]);
        restored_request.description = reason.clone();
        let restored_request = restored_request.normalize()?;

        // Step 1: back up the state about to be overwritten.
        let backup_request = SnapshotRequest::labeled(PRE_REVERT_LABEL)
            .with_tags([PRE_REVERT_TAG])
            .normalize()?;
        let backup = self
            .snapshot_service
            .snapshot_entity(&entity, actor_id, backup_request)
            .await?;

        // Step 2: copy the target's tracked fields onto the live entity.
        let restored = self
            .entities
            .write_fields(entity_id, &target.fields(), actor_id)
            .await
            .map_err(|e| incomplete::<E>(entity_id, 2, "restore tracked fields", backup.version, e))?;

        // Step 3: record the restored state as a new version.
        let restored_request = restored_request.with_metadata(json!({
            "reverted_to_version": target.version,
            "target_snapshot_id": target.id,
            "backup_version": backup.version,
            "reason": reason,
        }));
        let reverted = self
            .snapshot_service
            .snapshot_entity(&restored, actor_id, restored_request)
            .await
            .map_err(|e| incomplete::<E>(entity_id, 3, "record reverted state", backup.version, e))?;

        info!(
            entity_kind = %E::KIND,
            entity_id = %entity_id,
            actor_id,
            target_version = target.version,
            backup_version = backup.version,
            version = reverted.version,
            "Entity reverted"
        );

        let mut entity = restored;
        if entity.current_version() < reverted.version {
            entity.set_current_version(reverted.version);
        }

        Ok(RevertOutcome {
            entity,
            backup,
            reverted,
        })
    }

    async fn resolve_target(&self, entity_id: Uuid, target: RevertTarget) -> AppResult<Snapshot> {
        let found = match target {
            RevertTarget::Version(version) => {
                self.snapshots
                    .find_version(E::KIND, entity_id, version)
                    .await?
            }
            RevertTarget::Snapshot(id) => self
                .snapshots
                .find_by_id(id)
                .await?
                .filter(|s| s.entity_kind == E::KIND && s.entity_id == entity_id),
        };
        found.ok_or_else(|| {
            AppError::not_found(format!(
                "Revert target {target:?} not found for {} {entity_id}",
                E::KIND
            ))
        })
    }
}

/// A reference to an entity's revert lock. Dropping the last reference
/// removes the map entry, including when the revert future is cancelled.
struct EntityLock<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    entity_id: Uuid,
    mutex: Arc<Mutex<()>>,
}

impl<'a> EntityLock<'a> {
    fn acquire(locks: &'a DashMap<Uuid, Arc<Mutex<()>>>, entity_id: Uuid) -> Self {
        let mutex = locks
            .entry(entity_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            locks,
            entity_id,
            mutex,
        }
    }

    fn mutex(&self) -> &Mutex<()> {
        &self.mutex
    }
}

impl Drop for EntityLock<'_> {
    fn drop(&mut self) {
        // Two references left means only the map and this handle.
        self.locks
            .remove_if(&self.entity_id, |_, m| Arc::strong_count(m) == 2);
    }
}

fn incomplete<E: VersionedEntity>(
    entity_id: Uuid,
    step: u8,
    action: &str,
    backup_version: i32,
    source: AppError,
) -> AppError {
    warn!(
        entity_kind = %E::KIND,
        entity_id = %entity_id,
        step,
        backup_version,
        error = %source,
        "Revert stopped after backup"
    );
    AppError::with_source(
        ErrorKind::RevertIncomplete,
        format!(
            "Revert of {} {entity_id} failed at step {step} ({action}); backup snapshot v{backup_version} was kept",
            E::KIND
        ),
        source,
    )
}
