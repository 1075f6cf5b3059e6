//! Actors recorded on snapshots.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Display information for a user id stored in `created_by_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActorProfile {
    /// The host application's user id.
    pub id: i64,
    /// Name shown next to history entries.
    pub display_name: String,
}
