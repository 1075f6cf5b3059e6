//! Snapshot domain entities.

pub mod diff;
pub mod model;
pub mod stats;

pub use diff::{ChangeType, FieldDiff};
pub use model::{NewSnapshot, Snapshot, SnapshotLabels};
pub use stats::VersionStats;
