//! Field-level diff value objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a tracked field changed between two captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Absent before, present after.
    Added,
    /// Present before, absent after.
    Removed,
    /// Present on both sides with different values.
    Modified,
}

impl ChangeType {
    /// The classification seen when comparing in the opposite direction.
    pub fn mirrored(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            Self::Modified => Self::Modified,
        }
    }
}

/// A single tracked field that differs between two captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDiff {
    /// Tracked field name.
    pub field: String,
    /// Value on the old side (`None` when absent).
    pub old_value: Option<Value>,
    /// Value on the new side (`None` when absent).
    pub new_value: Option<Value>,
    /// Classification.
    pub change_type: ChangeType,
}

impl FieldDiff {
    /// The same difference viewed from the other side.
    pub fn mirrored(&self) -> Self {
        Self {
            field: self.field.clone(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
            change_type: self.change_type.mirrored(),
        }
    }
}
