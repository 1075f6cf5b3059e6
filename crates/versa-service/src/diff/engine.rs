//! Diff engine over tracked fields.

use serde_json::{Map, Value, json};

use versa_entity::fields::{FieldSet, VersionedEntity};
use versa_entity::snapshot::{ChangeType, FieldDiff, Snapshot};

use super::canonical::canonical_json;

/// Compares two captures of the same entity kind field by field.
///
/// Only the tracked fields are considered, in tracked order. A field
/// missing from a capture and a field holding `null` are both treated as
/// absent. Present values are compared by their canonical serialization,
/// so metadata objects built with different key orders compare equal.
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    tracked: &'static [&'static str],
}

impl DiffEngine {
    /// A diff engine over an explicit tracked-field list.
    pub fn new(tracked: &'static [&'static str]) -> Self {
        Self { tracked }
    }

    /// A diff engine over the tracked fields of `E`.
    pub fn for_entity<E: VersionedEntity>() -> Self {
        Self::new(E::TRACKED_FIELDS)
    }

    /// Differences going from `old` to `new`.
    pub fn diff(&self, old: &FieldSet, new: &FieldSet) -> Vec<FieldDiff> {
        self.tracked
            .iter()
            .filter_map(|field| {
                let before = present(old, field);
                let after = present(new, field);
                let change_type = match (before, after) {
                    (None, None) => return None,
                    (None, Some(_)) => ChangeType::Added,
                    (Some(_), None) => ChangeType::Removed,
                    (Some(a), Some(b)) if canonical_json(a) == canonical_json(b) => return None,
                    (Some(_), Some(_)) => ChangeType::Modified,
                };
                Some(FieldDiff {
                    field: (*field).to_string(),
                    old_value: before.cloned(),
                    new_value: after.cloned(),
                    change_type,
                })
            })
            .collect()
    }

    /// Differences going from snapshot `old` to snapshot `new`.
    pub fn diff_snapshots(&self, old: &Snapshot, new: &Snapshot) -> Vec<FieldDiff> {
        self.diff(&old.fields(), &new.fields())
    }
}

fn present<'a>(fields: &'a FieldSet, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

/// Render diffs as the `{field: {old, new}}` object cached on a snapshot.
pub fn changed_fields_map(diffs: &[FieldDiff]) -> Value {
    let map: Map<String, Value> = diffs
        .iter()
        .map(|d| {
            (
                d.field.clone(),
                json!({
                    "old": d.old_value.clone().unwrap_or(Value::Null),
                    "new": d.new_value.clone().unwrap_or(Value::Null),
                }),
            )
        })
        .collect();
    Value::Object(map)
}
