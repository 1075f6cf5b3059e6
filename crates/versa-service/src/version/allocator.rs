//! Optimistic version allocation.
//!
//! Versions are allocated by reading the current maximum, building a draft
//! at `max + 1`, and inserting it under the repository's uniqueness
//! constraint. A lost race surfaces as [`ErrorKind::Conflict`]; the loop
//! re-reads and retries with bounded, jittered exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use versa_core::config::VersioningConfig;
use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_database::traits::SnapshotRepository;
use versa_entity::kind::EntityKind;
use versa_entity::snapshot::{NewSnapshot, Snapshot};

/// Retry budget for version allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total insert attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first conflict.
    pub base_delay: Duration,
    /// Upper bound on a single delay.
    pub max_delay: Duration,
    /// Fraction of each delay drawn at random, so racing writers spread out.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// [`delay_for`](Self::delay_for) shortened by a random share of at
    /// most `jitter`. Never longer than the unjittered delay.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let delay = self.delay_for(attempt);
        if self.jitter.is_nan() || self.jitter <= 0.0 {
            return delay;
        }
        let jitter = self.jitter.min(1.0);
        delay.mul_f64(1.0 - jitter * rand::random::<f64>())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&VersioningConfig::default())
    }
}

impl From<&VersioningConfig> for RetryPolicy {
    fn from(config: &VersioningConfig) -> Self {
        Self {
            max_attempts: config.max_allocation_attempts.max(1),
            base_delay: Duration::from_millis(config.base_backoff_ms),
            max_delay: Duration::from_millis(config.max_backoff_ms),
            jitter: config.backoff_jitter,
        }
    }
}

/// A candidate version and the snapshot it follows.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Candidate version number.
    pub version: i32,
    /// Latest existing snapshot, `None` for the first version.
    pub parent: Option<Snapshot>,
}

/// Hands out strictly increasing version numbers per entity.
#[derive(Clone)]
pub struct VersionAllocator {
    snapshots: Arc<dyn SnapshotRepository>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for VersionAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionAllocator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl VersionAllocator {
    /// Creates a new allocator over a snapshot repository.
    pub fn new(snapshots: Arc<dyn SnapshotRepository>, policy: RetryPolicy) -> Self {
        Self { snapshots, policy }
    }

    /// Read the next candidate version. Nothing is reserved.
    pub async fn next_version(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<Allocation> {
        let parent = self.snapshots.find_latest(kind, entity_id).await?;
        let version = match &parent {
            Some(latest) => latest.version.checked_add(1).ok_or_else(|| {
                AppError::internal(format!("Version counter exhausted for {kind} {entity_id}"))
            })?,
            None => 1,
        };
        Ok(Allocation { version, parent })
    }

    /// Insert the draft built for the next free version.
    ///
    /// `build` is called once per attempt with a fresh allocation. Errors
    /// other than a uniqueness conflict are returned unchanged.
    pub async fn insert_next<F>(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        mut build: F,
    ) -> AppResult<Snapshot>
    where
        F: FnMut(&Allocation) -> AppResult<NewSnapshot> + Send,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let allocation = self.next_version(kind, entity_id).await?;
            let draft = build(&allocation)?;

            match self.snapshots.insert(&draft).await {
                Ok(snapshot) => {
                    debug!(
                        entity_kind = %kind,
                        entity_id = %entity_id,
                        version = snapshot.version,
                        attempt,
                        "Allocated snapshot version"
                    );
                    return Ok(snapshot);
                }
                Err(e) if e.kind == ErrorKind::Conflict => {
                    if attempt >= self.policy.max_attempts {
                        warn!(
                            entity_kind = %kind,
                            entity_id = %entity_id,
                            attempts = attempt,
                            "Version allocation retries exhausted"
                        );
                        return Err(AppError::concurrency(format!(
                            "Could not allocate a version for {kind} {entity_id} after {attempt} attempts"
                        )));
                    }
                    let delay = self.policy.jittered_delay(attempt);
                    warn!(
                        entity_kind = %kind,
                        entity_id = %entity_id,
                        version = allocation.version,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Snapshot version taken, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
