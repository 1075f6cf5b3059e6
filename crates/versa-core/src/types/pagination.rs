//! Limit/offset pagination for version history listings.

use serde::{Deserialize, Serialize};

/// Default number of history entries per request.
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

/// Request parameters for a history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Maximum number of entries to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of newest entries to skip.
    #[serde(default)]
    pub offset: u64,
}

impl HistoryPage {
    /// Create a page request.
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Clamp the limit into `1..=max_limit`.
    pub fn clamped(self, max_limit: u64) -> Self {
        Self {
            limit: self.limit.clamp(1, max_limit.max(1)),
            offset: self.offset,
        }
    }

    /// Return the SQL `LIMIT` value.
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    /// Return the SQL `OFFSET` value.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
            offset: 0,
        }
    }
}

fn default_limit() -> u64 {
    DEFAULT_HISTORY_LIMIT
}
