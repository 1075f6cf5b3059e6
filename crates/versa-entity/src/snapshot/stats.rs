//! Aggregate version statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of an entity's snapshot history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStats {
    /// Number of stored snapshots.
    pub total_versions: u64,
    /// Snapshots flagged major.
    pub major_versions: u64,
    /// Snapshots not flagged major.
    pub minor_versions: u64,
    /// Creation time of the newest snapshot.
    pub last_modified: Option<DateTime<Utc>>,
    /// Distinct snapshot creators.
    pub contributor_count: u64,
}
