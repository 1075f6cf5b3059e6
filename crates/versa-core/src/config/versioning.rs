//! Snapshot versioning configuration.

use serde::{Deserialize, Serialize};

/// Tuning for version allocation and history queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// Insert attempts before allocation gives up with a concurrency error.
    #[serde(default = "default_max_attempts")]
    pub max_allocation_attempts: u32,
    /// Delay before the first retry, in milliseconds. Doubles per attempt.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_ms: u64,
    /// Upper bound on a single retry delay, in milliseconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Fraction of each retry delay that is randomized, in `[0, 1]`.
    #[serde(default = "default_backoff_jitter")]
    pub backoff_jitter: f64,
    /// Page size used when a history request does not give one.
    #[serde(default = "default_history_limit")]
    pub default_history_limit: u64,
    /// Largest page size a history request may ask for.
    #[serde(default = "default_max_history_limit")]
    pub max_history_limit: u64,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            max_allocation_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff(),
            max_backoff_ms: default_max_backoff(),
            backoff_jitter: default_backoff_jitter(),
            default_history_limit: default_history_limit(),
            max_history_limit: default_max_history_limit(),
        }
    }
}

fn default_max_attempts() -> u32 {
    8
}

fn default_base_backoff() -> u64 {
    5
}

fn default_max_backoff() -> u64 {
    200
}

fn default_backoff_jitter() -> f64 {
    0.5
}

fn default_history_limit() -> u64 {
    50
}

fn default_max_history_limit() -> u64 {
    200
}
