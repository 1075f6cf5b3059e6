//! Snapshot entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::fields::FieldSet;
use crate::kind::EntityKind;

/// An immutable version record of an entity's tracked fields.
///
/// Only `label`, `description`, and `tags` may change after the row is
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Snapshot {
    /// Unique snapshot identifier.
    pub id: Uuid,
    /// Which kind of entity this snapshot captures.
    pub entity_kind: EntityKind,
    /// The captured entity.
    pub entity_id: Uuid,
    /// Version number, unique per entity and starting at 1.
    pub version: i32,
    /// Short human label.
    pub label: Option<String>,
    /// Longer change summary.
    pub description: Option<String>,
    /// Captured tracked fields (JSON object).
    pub snapshot_data: serde_json::Value,
    /// Free-form metadata attached by the caller or by revert.
    pub metadata: Option<serde_json::Value>,
    /// Labels for categorization and search.
    pub tags: Vec<String>,
    /// Whether this is a major version.
    pub is_major: bool,
    /// `{field: {old, new}}` against the parent, computed at creation.
    pub changed_fields: Option<serde_json::Value>,
    /// Version this snapshot was diffed against. Historical only; the
    /// referenced row may since have been deleted.
    pub parent_version: Option<i32>,
    /// User who created this snapshot.
    pub created_by_id: i64,
    /// When this snapshot was created.
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// The captured tracked fields as a [`FieldSet`].
    pub fn fields(&self) -> FieldSet {
        match &self.snapshot_data {
            serde_json::Value::Object(map) => {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            _ => FieldSet::new(),
        }
    }

    /// Check whether the snapshot carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Data required to insert a snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSnapshot {
    /// Entity kind.
    pub entity_kind: EntityKind,
    /// Entity id.
    pub entity_id: Uuid,
    /// Candidate version number.
    pub version: i32,
    /// Label.
    pub label: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Captured tracked fields.
    pub snapshot_data: serde_json::Value,
    /// Metadata.
    pub metadata: Option<serde_json::Value>,
    /// Tags.
    pub tags: Vec<String>,
    /// Major version flag.
    pub is_major: bool,
    /// Cached diff against the parent.
    pub changed_fields: Option<serde_json::Value>,
    /// Parent version.
    pub parent_version: Option<i32>,
    /// Creating user.
    pub created_by_id: i64,
}

impl NewSnapshot {
    /// Materialize the row as a store would after inserting it.
    pub fn into_snapshot(self, id: Uuid, created_at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            id,
            entity_kind: self.entity_kind,
            entity_id: self.entity_id,
            version: self.version,
            label: self.label,
            description: self.description,
            snapshot_data: self.snapshot_data,
            metadata: self.metadata,
            tags: self.tags,
            is_major: self.is_major,
            changed_fields: self.changed_fields,
            parent_version: self.parent_version,
            created_by_id: self.created_by_id,
            created_at,
        }
    }
}

/// The mutable annotations of a snapshot. `None` leaves a value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLabels {
    /// New label.
    pub label: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
}

impl SnapshotLabels {
    /// Whether applying these labels would change nothing.
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.description.is_none() && self.tags.is_none()
    }

    /// Apply the labels to a snapshot in place.
    pub fn apply(&self, snapshot: &mut Snapshot) {
        if let Some(label) = &self.label {
            snapshot.label = Some(label.clone());
        }
        if let Some(description) = &self.description {
            snapshot.description = Some(description.clone());
        }
        if let Some(tags) = &self.tags {
            snapshot.tags = tags.clone();
        }
    }
}
