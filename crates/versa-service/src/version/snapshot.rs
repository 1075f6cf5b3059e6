//! Snapshot creation and annotation.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use versa_core::error::AppError;
use versa_core::result::AppResult;
use versa_core::traits::Service;
use versa_database::traits::{EntityStore, SnapshotRepository};
use versa_entity::fields::VersionedEntity;
use versa_entity::snapshot::{NewSnapshot, Snapshot, SnapshotLabels};

use super::allocator::VersionAllocator;
use crate::diff::{DiffEngine, changed_fields_map};

/// Longest accepted label.
pub const MAX_LABEL_LEN: u64 = 255;
/// Longest accepted description.
pub const MAX_DESCRIPTION_LEN: u64 = 2000;
/// Longest accepted tag.
pub const MAX_TAG_LEN: usize = 64;
/// Most tags a snapshot may carry.
pub const MAX_TAGS: u64 = 32;

/// Caller-supplied annotations for a new snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SnapshotRequest {
    /// Short human label.
    #[validate(length(max = MAX_LABEL_LEN))]
    pub label: Option<String>,
    /// Longer change summary.
    #[validate(length(max = MAX_DESCRIPTION_LEN))]
    pub description: Option<String>,
    /// Tags. Trimmed and de-duplicated before storage; the count limit
    /// applies to the de-duplicated set.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Major version flag.
    #[serde(default)]
    pub is_major: bool,
    /// Free-form JSON object stored with the snapshot.
    pub metadata: Option<Value>,
}

impl SnapshotRequest {
    /// A request carrying only a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Flag the snapshot as a major version.
    pub fn major(mut self) -> Self {
        self.is_major = true;
        self
    }

    /// Validate and normalize the request in place.
    pub(crate) fn normalize(mut self) -> AppResult<Self> {
        self.validate()?;
        self.tags = normalize_tags(self.tags)?;
        if let Some(metadata) = &self.metadata {
            if !metadata.is_object() {
                return Err(AppError::validation("Snapshot metadata must be a JSON object"));
            }
        }
        Ok(self)
    }
}

/// Trim, drop duplicates, and bound the tag set. First occurrence wins.
pub(crate) fn normalize_tags(tags: Vec<String>) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(AppError::validation("Tags must not be empty"));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(AppError::validation(format!(
                "Tag '{tag}' exceeds {MAX_TAG_LEN} characters"
            )));
        }
        if seen.insert(tag.to_string()) {
            out.push(tag.to_string());
        }
    }
    if out.len() as u64 > MAX_TAGS {
        return Err(AppError::validation(format!(
            "A snapshot may carry at most {MAX_TAGS} tags"
        )));
    }
    Ok(out)
}

fn check_len(field: &str, value: Option<&str>, max: u64) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() as u64 > max => Err(AppError::validation(format!(
            "{field} exceeds {max} characters"
        ))),
        _ => Ok(()),
    }
}

/// Captures immutable versions of live entities.
pub struct SnapshotService<E: VersionedEntity> {
    /// Live entity store.
    entities: Arc<dyn EntityStore<E>>,
    /// Snapshot repository.
    snapshots: Arc<dyn SnapshotRepository>,
    /// Version allocator over the same repository.
    allocator: VersionAllocator,
    /// Diff engine for `changed_fields`.
    diff: DiffEngine,
}

impl<E: VersionedEntity> Clone for SnapshotService<E> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            snapshots: Arc::clone(&self.snapshots),
            allocator: self.allocator.clone(),
            diff: self.diff,
        }
    }
}

impl<E: VersionedEntity> Service for SnapshotService<E> {}

impl<E: VersionedEntity> SnapshotService<E> {
    /// Creates a new snapshot service.
    pub fn new(
        entities: Arc<dyn EntityStore<E>>,
        snapshots: Arc<dyn SnapshotRepository>,
        allocator: VersionAllocator,
    ) -> Self {
        Self {
            entities,
            snapshots,
            allocator,
            diff: DiffEngine::for_entity::<E>(),
        }
    }

    /// Capture the current state of an entity as a new version.
    pub async fn create_snapshot(
        &self,
        entity_id: Uuid,
        actor_id: i64,
        request: SnapshotRequest,
    ) -> AppResult<Snapshot> {
        let request = request.normalize()?;
        let entity = self.load_entity(entity_id).await?;
        self.snapshot_entity(&entity, actor_id, request).await
    }

    /// Capture an already-loaded entity. `request` must be normalized.
    pub(crate) async fn snapshot_entity(
        &self,
        entity: &E,
        actor_id: i64,
        request: SnapshotRequest,
    ) -> AppResult<Snapshot> {
        let entity_id = entity.id();
        let fields = entity.capture();
        let snapshot_data = Value::Object(fields.clone().into_iter().collect());
        let diff = self.diff;

        let snapshot = self
            .allocator
            .insert_next(E::KIND, entity_id, |allocation| {
                let changed_fields = allocation
                    .parent
                    .as_ref()
                    .map(|parent| changed_fields_map(&diff.diff(&parent.fields(), &fields)));
                Ok(NewSnapshot {
                    entity_kind: E::KIND,
                    entity_id,
                    version: allocation.version,
                    label: request.label.clone(),
                    description: request.description.clone(),
                    snapshot_data: snapshot_data.clone(),
                    metadata: request.metadata.clone(),
                    tags: request.tags.clone(),
                    is_major: request.is_major,
                    changed_fields,
                    parent_version: allocation.parent.as_ref().map(|p| p.version),
                    created_by_id: actor_id,
                })
            })
            .await?;

        self.entities
            .advance_version(entity_id, snapshot.version)
            .await?;

        info!(
            entity_kind = %E::KIND,
            entity_id = %entity_id,
            version = snapshot.version,
            actor_id,
            is_major = snapshot.is_major,
            "Snapshot created"
        );

        Ok(snapshot)
    }

    /// Change the label, description, or tags of a snapshot.
    pub async fn update_labels(&self, id: Uuid, labels: SnapshotLabels) -> AppResult<Snapshot> {
        check_len("Label", labels.label.as_deref(), MAX_LABEL_LEN)?;
        check_len(
            "Description",
            labels.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?;
        let labels = SnapshotLabels {
            tags: labels.tags.map(normalize_tags).transpose()?,
            ..labels
        };

        let existing = self.find_own(id).await?;
        if labels.is_empty() {
            debug!(snapshot_id = %id, "No label changes requested");
            return Ok(existing);
        }

        let updated = self.snapshots.update_labels(id, &labels).await?;
        info!(
            entity_kind = %E::KIND,
            entity_id = %updated.entity_id,
            version = updated.version,
            "Snapshot labels updated"
        );
        Ok(updated)
    }

    /// Delete a snapshot that is not the entity's current version.
    ///
    /// The newest snapshot is never deletable either, so a version number
    /// is never handed out twice.
    pub async fn delete_snapshot(&self, id: Uuid) -> AppResult<()> {
        let snapshot = self.find_own(id).await?;

        let pointer = self
            .entities
            .find_by_id(snapshot.entity_id)
            .await?
            .map(|e| e.current_version())
            .unwrap_or(0);
        let latest = self
            .snapshots
            .find_latest(E::KIND, snapshot.entity_id)
            .await?
            .map(|s| s.version)
            .unwrap_or(0);

        if snapshot.version >= pointer.max(latest) {
            return Err(AppError::validation(format!(
                "Version {} is the current version of {} {} and cannot be deleted",
                snapshot.version,
                E::KIND,
                snapshot.entity_id
            )));
        }

        if !self.snapshots.delete(id).await? {
            return Err(AppError::not_found(format!("Snapshot {id} not found")));
        }

        info!(
            entity_kind = %E::KIND,
            entity_id = %snapshot.entity_id,
            version = snapshot.version,
            "Snapshot deleted"
        );
        Ok(())
    }

    /// Load a live entity or fail with not-found.
    pub(crate) async fn load_entity(&self, entity_id: Uuid) -> AppResult<E> {
        self.entities
            .find_by_id(entity_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {entity_id} not found", E::KIND)))
    }

    /// Load a snapshot of this service's entity kind or fail with not-found.
    pub(crate) async fn find_own(&self, id: Uuid) -> AppResult<Snapshot> {
        self.snapshots
            .find_by_id(id)
            .await?
            .filter(|s| s.entity_kind == E::KIND)
            .ok_or_else(|| AppError::not_found(format!("Snapshot {id} not found")))
    }
}
