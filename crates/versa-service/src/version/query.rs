//! Read-side queries over snapshot history.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use versa_core::error::AppError;
use versa_core::result::AppResult;
use versa_core::traits::Service;
use versa_core::types::HistoryPage;
use versa_database::traits::{ActorDirectory, EntityStore, SnapshotRepository};
use versa_entity::fields::VersionedEntity;
use versa_entity::snapshot::{FieldDiff, Snapshot, VersionStats};

use crate::diff::DiffEngine;

/// A history row enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// The snapshot.
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// Creator's display name, when the directory knows it.
    pub created_by_name: Option<String>,
    /// Diff against `parent_version`; `None` for the first version or when
    /// the parent has been deleted.
    pub diff_from_parent: Option<Vec<FieldDiff>>,
}

/// A snapshot together with its diff against its parent.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDetail {
    /// The snapshot.
    pub snapshot: Snapshot,
    /// Diff against the parent, if the parent still exists.
    pub parent_diff: Option<Vec<FieldDiff>>,
}

/// Side-effect-free reads over an entity's versions.
pub struct QueryService<E: VersionedEntity> {
    entities: Arc<dyn EntityStore<E>>,
    snapshots: Arc<dyn SnapshotRepository>,
    actors: Option<Arc<dyn ActorDirectory>>,
    diff: DiffEngine,
    max_history_limit: u64,
}

impl<E: VersionedEntity> Clone for QueryService<E> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            snapshots: Arc::clone(&self.snapshots),
            actors: self.actors.clone(),
            diff: self.diff,
            max_history_limit: self.max_history_limit,
        }
    }
}

impl<E: VersionedEntity> Service for QueryService<E> {}

impl<E: VersionedEntity> QueryService<E> {
    /// Creates a new query service.
    pub fn new(
        entities: Arc<dyn EntityStore<E>>,
        snapshots: Arc<dyn SnapshotRepository>,
        actors: Option<Arc<dyn ActorDirectory>>,
        max_history_limit: u64,
    ) -> Self {
        Self {
            entities,
            snapshots,
            actors,
            diff: DiffEngine::for_entity::<E>(),
            max_history_limit,
        }
    }

    /// List an entity's versions, newest first.
    pub async fn get_history(&self, entity_id: Uuid, page: HistoryPage) -> AppResult<Vec<HistoryEntry>> {
        self.require_entity(entity_id).await?;
        let page = page.clamped(self.max_history_limit);

        let snapshots = self.snapshots.list(E::KIND, entity_id, page).await?;
        debug!(
            entity_kind = %E::KIND,
            entity_id = %entity_id,
            limit = page.limit,
            offset = page.offset,
            returned = snapshots.len(),
            "Listed version history"
        );

        let names = self.display_names(&snapshots).await?;
        let by_version: HashMap<i32, &Snapshot> =
            snapshots.iter().map(|s| (s.version, s)).collect();

        let mut entries = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            let parent = match snapshot.parent_version {
                None => None,
                Some(v) => match by_version.get(&v) {
                    Some(p) => Some((*p).clone()),
                    None => self.snapshots.find_version(E::KIND, entity_id, v).await?,
                },
            };
            entries.push(HistoryEntry {
                created_by_name: names.get(&snapshot.created_by_id).cloned(),
                diff_from_parent: parent.map(|p| self.diff.diff_snapshots(&p, snapshot)),
                snapshot: snapshot.clone(),
            });
        }
        Ok(entries)
    }

    /// Find a snapshot by id.
    pub async fn get_snapshot(&self, id: Uuid) -> AppResult<Option<Snapshot>> {
        Ok(self
            .snapshots
            .find_by_id(id)
            .await?
            .filter(|s| s.entity_kind == E::KIND))
    }

    /// Find a snapshot by id along with its parent diff.
    pub async fn get_snapshot_detail(&self, id: Uuid) -> AppResult<Option<SnapshotDetail>> {
        let Some(snapshot) = self.get_snapshot(id).await? else {
            return Ok(None);
        };
        let parent = match snapshot.parent_version {
            Some(v) => {
                self.snapshots
                    .find_version(E::KIND, snapshot.entity_id, v)
                    .await?
            }
            None => None,
        };
        Ok(Some(SnapshotDetail {
            parent_diff: parent.map(|p| self.diff.diff_snapshots(&p, &snapshot)),
            snapshot,
        }))
    }

    /// Find a version of an entity by number.
    pub async fn get_version(&self, entity_id: Uuid, version: i32) -> AppResult<Option<Snapshot>> {
        self.snapshots.find_version(E::KIND, entity_id, version).await
    }

    /// Diff snapshot `a` (old side) against snapshot `b` (new side).
    pub async fn compare_versions(&self, a: Uuid, b: Uuid) -> AppResult<Vec<FieldDiff>> {
        let old = self.require_snapshot(a).await?;
        let new = self.require_snapshot(b).await?;
        Ok(self.diff.diff_snapshots(&old, &new))
    }

    /// Diff a snapshot against the current live entity.
    pub async fn compare_with_live(&self, id: Uuid) -> AppResult<Vec<FieldDiff>> {
        let snapshot = self.require_snapshot(id).await?;
        let entity = self.require_entity(snapshot.entity_id).await?;
        Ok(self.diff.diff(&snapshot.fields(), &entity.capture()))
    }

    /// Aggregate statistics for an entity.
    pub async fn get_stats(&self, entity_id: Uuid) -> AppResult<VersionStats> {
        self.require_entity(entity_id).await?;
        self.snapshots.stats(E::KIND, entity_id).await
    }

    /// Versions of an entity carrying `tag`, newest first.
    pub async fn find_by_tag(&self, entity_id: Uuid, tag: &str) -> AppResult<Vec<Snapshot>> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(AppError::validation("Tag must not be empty"));
        }
        self.snapshots.find_by_tag(E::KIND, entity_id, tag).await
    }

    async fn require_entity(&self, entity_id: Uuid) -> AppResult<E> {
        self.entities
            .find_by_id(entity_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {entity_id} not found", E::KIND)))
    }

    async fn require_snapshot(&self, id: Uuid) -> AppResult<Snapshot> {
        self.get_snapshot(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Snapshot {id} not found")))
    }

    async fn display_names(&self, snapshots: &[Snapshot]) -> AppResult<HashMap<i64, String>> {
        let Some(actors) = &self.actors else {
            return Ok(HashMap::new());
        };
        let ids: Vec<i64> = snapshots
            .iter()
            .map(|s| s.created_by_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        actors.display_names(&ids).await
    }
}
