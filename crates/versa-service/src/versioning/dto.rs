//! Transport shapes returned to host request handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use versa_entity::snapshot::{FieldDiff, Snapshot};

use crate::version::HistoryEntry;

/// A snapshot as seen by API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDto {
    /// Snapshot id.
    pub id: Uuid,
    /// Versioned entity id.
    pub entity_id: Uuid,
    /// Version number.
    pub version: i32,
    /// Label.
    pub label: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Captured tracked fields.
    pub snapshot_data: Value,
    /// Creating user.
    pub created_by_id: i64,
    /// Creation time (ISO 8601).
    pub created_at: DateTime<Utc>,
    /// Metadata.
    pub metadata: Option<Value>,
    /// Tags.
    pub tags: Vec<String>,
    /// Major version flag.
    pub is_major: bool,
    /// Cached `{field: {old, new}}` against the parent.
    pub changed_fields: Option<Value>,
    /// Parent version.
    pub parent_version: Option<i32>,
}

impl From<Snapshot> for SnapshotDto {
    fn from(s: Snapshot) -> Self {
        Self {
            id: s.id,
            entity_id: s.entity_id,
            version: s.version,
            label: s.label,
            description: s.description,
            snapshot_data: s.snapshot_data,
            created_by_id: s.created_by_id,
            created_at: s.created_at,
            metadata: s.metadata,
            tags: s.tags,
            is_major: s.is_major,
            changed_fields: s.changed_fields,
            parent_version: s.parent_version,
        }
    }
}

/// A history row: the snapshot plus display enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItemDto {
    /// The snapshot.
    #[serde(flatten)]
    pub version: SnapshotDto,
    /// Creator's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    /// Diff against the parent version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_from_parent: Option<Vec<FieldDiff>>,
}

impl From<HistoryEntry> for HistoryItemDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            version: entry.snapshot.into(),
            created_by_name: entry.created_by_name,
            diff_from_parent: entry.diff_from_parent,
        }
    }
}

/// Result of comparing two versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDto {
    /// Field differences, old side first.
    pub differences: Vec<FieldDiff>,
}
