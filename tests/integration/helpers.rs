//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use versa_core::config::VersioningConfig;
use versa_core::types::HistoryPage;
use versa_core::{AppError, AppResult};
use versa_database::memory::{MemoryActorDirectory, MemoryEntityStore, MemorySnapshotRepository};
use versa_database::traits::{ActorDirectory, EntityStore, SnapshotRepository};
use versa_entity::fields::{FieldSet, VersionedEntity};
use versa_entity::kind::EntityKind;
use versa_entity::proposal::{CreateProposal, Proposal};
use versa_entity::snapshot::{NewSnapshot, Snapshot, SnapshotLabels, VersionStats};
use versa_service::VersioningService;

/// The user id most tests act as.
pub const ALICE: i64 = 1;
/// A second editor.
pub const BOB: i64 = 2;

/// Versioning settings with short backoff so contention tests stay fast.
pub fn test_config() -> VersioningConfig {
    VersioningConfig {
        max_allocation_attempts: 50,
        base_backoff_ms: 1,
        max_backoff_ms: 10,
        ..VersioningConfig::default()
    }
}

/// Entity store that can be told to reject field writes.
pub struct FlakyStore {
    inner: Arc<MemoryEntityStore<Proposal>>,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryEntityStore<Proposal>>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntityStore<Proposal> for FlakyStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Proposal>> {
        self.inner.find_by_id(id).await
    }

    async fn write_fields(&self, id: Uuid, fields: &FieldSet, actor_id: i64) -> AppResult<Proposal> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage("proposal row is locked by maintenance"));
        }
        self.inner.write_fields(id, fields, actor_id).await
    }

    async fn advance_version(&self, id: Uuid, version: i32) -> AppResult<()> {
        self.inner.advance_version(id, version).await
    }
}

/// Snapshot store that can be told to reject one upcoming insert.
pub struct FlakySnapshots {
    inner: Arc<MemorySnapshotRepository>,
    fail_countdown: AtomicU32,
}

impl FlakySnapshots {
    pub fn new(inner: Arc<MemorySnapshotRepository>) -> Self {
        Self {
            inner,
            fail_countdown: AtomicU32::new(0),
        }
    }

    /// Reject the `n`th insert from now. Earlier and later inserts pass.
    pub fn fail_nth_insert(&self, n: u32) {
        self.fail_countdown.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotRepository for FlakySnapshots {
    async fn insert(&self, snapshot: &NewSnapshot) -> AppResult<Snapshot> {
        let countdown = self
            .fail_countdown
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n > 0).then(|| n - 1));
        if countdown == Ok(1) {
            return Err(AppError::storage("snapshot volume is read-only"));
        }
        self.inner.insert(snapshot).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Snapshot>> {
        self.inner.find_by_id(id).await
    }

    async fn find_version(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        version: i32,
    ) -> AppResult<Option<Snapshot>> {
        self.inner.find_version(kind, entity_id, version).await
    }

    async fn find_latest(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<Option<Snapshot>> {
        self.inner.find_latest(kind, entity_id).await
    }

    async fn list(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        page: HistoryPage,
    ) -> AppResult<Vec<Snapshot>> {
        self.inner.list(kind, entity_id, page).await
    }

    async fn find_by_tag(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        tag: &str,
    ) -> AppResult<Vec<Snapshot>> {
        self.inner.find_by_tag(kind, entity_id, tag).await
    }

    async fn count(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<u64> {
        self.inner.count(kind, entity_id).await
    }

    async fn stats(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<VersionStats> {
        self.inner.stats(kind, entity_id).await
    }

    async fn update_labels(&self, id: Uuid, labels: &SnapshotLabels) -> AppResult<Snapshot> {
        self.inner.update_labels(id, labels).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete(id).await
    }
}

/// Proposal versioning over in-memory stores.
pub struct TestContext {
    pub proposals: Arc<MemoryEntityStore<Proposal>>,
    pub snapshots: Arc<MemorySnapshotRepository>,
    pub actors: Arc<MemoryActorDirectory>,
    pub flaky: Arc<FlakyStore>,
    pub flaky_snapshots: Arc<FlakySnapshots>,
    pub service: VersioningService<Proposal>,
}

impl TestContext {
    pub async fn new() -> Self {
        let proposals = Arc::new(MemoryEntityStore::new());
        let snapshots = Arc::new(MemorySnapshotRepository::new());
        let actors = Arc::new(MemoryActorDirectory::new());
        actors.register(ALICE, "Alice Moreau").await;
        actors.register(BOB, "Bob Okafor").await;

        let flaky = Arc::new(FlakyStore::new(proposals.clone()));
        let entities: Arc<dyn EntityStore<Proposal>> = flaky.clone();
        let flaky_snapshots = Arc::new(FlakySnapshots::new(snapshots.clone()));
        let repo: Arc<dyn SnapshotRepository> = flaky_snapshots.clone();
        let directory: Arc<dyn ActorDirectory> = actors.clone();
        let service = VersioningService::new(entities, repo, Some(directory), &test_config());

        Self {
            proposals,
            snapshots,
            actors,
            flaky,
            flaky_snapshots,
            service,
        }
    }

    /// Insert a fresh proposal with the given title.
    pub async fn proposal(&self, title: &str) -> Proposal {
        let proposal = Proposal::new(CreateProposal {
            title: title.to_string(),
            content: "Executive summary".to_string(),
            client_name: Some("Northwind".to_string()),
            created_by: ALICE,
            ..Default::default()
        });
        self.proposals.put(proposal.clone()).await;
        proposal
    }

    /// Edit a proposal's title the way a host request handler would.
    pub async fn retitle(&self, id: Uuid, title: &str) {
        let title = title.to_string();
        self.proposals
            .edit(id, move |p| p.title = title)
            .await
            .expect("proposal exists");
    }

    pub async fn live(&self, id: Uuid) -> Proposal {
        self.proposals.get(id).await.expect("proposal exists")
    }

    pub async fn snapshot_count(&self, id: Uuid) -> u64 {
        self.snapshots
            .count(Proposal::KIND, id)
            .await
            .expect("count snapshots")
    }
}
