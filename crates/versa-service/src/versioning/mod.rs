//! Inbound versioning operations for one entity kind.
//!
//! [`VersioningService`] is what a host wires into its request handlers.
//! It composes the snapshot, revert, and query services over shared stores
//! and returns transport DTOs.

pub mod dto;

use std::sync::Arc;

use uuid::Uuid;

use versa_core::config::VersioningConfig;
use versa_core::result::AppResult;
use versa_core::traits::Service;
use versa_core::types::HistoryPage;
use versa_database::traits::{ActorDirectory, EntityStore, SnapshotRepository};
use versa_entity::fields::VersionedEntity;
use versa_entity::snapshot::{SnapshotLabels, VersionStats};

pub use dto::{ComparisonDto, HistoryItemDto, SnapshotDto};

use crate::version::{
    QueryService, RetryPolicy, RevertService, RevertTarget, SnapshotRequest, SnapshotService,
    VersionAllocator,
};

/// Versioning facade for entities of type `E`.
pub struct VersioningService<E: VersionedEntity> {
    snapshots: SnapshotService<E>,
    reverts: RevertService<E>,
    queries: QueryService<E>,
    default_history_limit: u64,
}

impl<E: VersionedEntity> Clone for VersioningService<E> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
            reverts: self.reverts.clone(),
            queries: self.queries.clone(),
            default_history_limit: self.default_history_limit,
        }
    }
}

impl<E: VersionedEntity> Service for VersioningService<E> {}

impl<E: VersionedEntity> VersioningService<E> {
    /// Wire the versioning services over the given stores.
    pub fn new(
        entities: Arc<dyn EntityStore<E>>,
        snapshot_repo: Arc<dyn SnapshotRepository>,
        actors: Option<Arc<dyn ActorDirectory>>,
        config: &VersioningConfig,
    ) -> Self {
        let allocator = VersionAllocator::new(Arc::clone(&snapshot_repo), RetryPolicy::from(config));
        let snapshots =
            SnapshotService::new(Arc::clone(&entities), Arc::clone(&snapshot_repo), allocator);
        let reverts = RevertService::new(
            Arc::clone(&entities),
            Arc::clone(&snapshot_repo),
            snapshots.clone(),
        );
        let queries = QueryService::new(entities, snapshot_repo, actors, config.max_history_limit);
        Self {
            snapshots,
            reverts,
            queries,
            default_history_limit: config.default_history_limit,
        }
    }

    /// The snapshot service.
    pub fn snapshot_service(&self) -> &SnapshotService<E> {
        &self.snapshots
    }

    /// The revert service.
    pub fn revert_service(&self) -> &RevertService<E> {
        &self.reverts
    }

    /// The query service.
    pub fn query_service(&self) -> &QueryService<E> {
        &self.queries
    }

    /// Snapshot an entity with an optional label and description.
    pub async fn create_snapshot(
        &self,
        entity_id: Uuid,
        user_id: i64,
        label: Option<String>,
        description: Option<String>,
    ) -> AppResult<SnapshotDto> {
        let request = SnapshotRequest {
            label,
            description,
            ..SnapshotRequest::default()
        };
        self.create_snapshot_with(entity_id, user_id, request).await
    }

    /// Snapshot an entity with full options.
    pub async fn create_snapshot_with(
        &self,
        entity_id: Uuid,
        user_id: i64,
        request: SnapshotRequest,
    ) -> AppResult<SnapshotDto> {
        self.snapshots
            .create_snapshot(entity_id, user_id, request)
            .await
            .map(SnapshotDto::from)
    }

    /// Compare two versions, `version_id_a` being the old side.
    pub async fn compare_versions(
        &self,
        version_id_a: Uuid,
        version_id_b: Uuid,
    ) -> AppResult<ComparisonDto> {
        let differences = self
            .queries
            .compare_versions(version_id_a, version_id_b)
            .await?;
        Ok(ComparisonDto { differences })
    }

    /// Compare a version against the live entity.
    pub async fn compare_with_live(&self, version_id: Uuid) -> AppResult<ComparisonDto> {
        let differences = self.queries.compare_with_live(version_id).await?;
        Ok(ComparisonDto { differences })
    }

    /// Revert the owning entity to `version_id`. Returns the snapshot that
    /// records the restored state.
    pub async fn revert_to_version(
        &self,
        version_id: Uuid,
        user_id: i64,
        reason: Option<String>,
    ) -> AppResult<SnapshotDto> {
        let target = self.snapshots.find_own(version_id).await?;
        let outcome = self
            .reverts
            .revert(
                target.entity_id,
                RevertTarget::Snapshot(version_id),
                user_id,
                reason,
            )
            .await?;
        Ok(outcome.reverted.into())
    }

    /// List an entity's versions, newest first.
    pub async fn get_version_history(
        &self,
        entity_id: Uuid,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<HistoryItemDto>> {
        let page = HistoryPage::new(
            limit.unwrap_or(self.default_history_limit),
            offset.unwrap_or(0),
        );
        let entries = self.queries.get_history(entity_id, page).await?;
        Ok(entries.into_iter().map(HistoryItemDto::from).collect())
    }

    /// Delete a version that is not the entity's current one.
    pub async fn delete_version(&self, version_id: Uuid) -> AppResult<()> {
        self.snapshots.delete_snapshot(version_id).await
    }

    /// Fetch a version by id.
    pub async fn get_version(&self, version_id: Uuid) -> AppResult<Option<SnapshotDto>> {
        Ok(self
            .queries
            .get_snapshot(version_id)
            .await?
            .map(SnapshotDto::from))
    }

    /// Change a version's label, description, or tags.
    pub async fn update_version_labels(
        &self,
        version_id: Uuid,
        label: Option<String>,
        description: Option<String>,
        tags: Option<Vec<String>>,
    ) -> AppResult<SnapshotDto> {
        let labels = SnapshotLabels {
            label,
            description,
            tags,
        };
        self.snapshots
            .update_labels(version_id, labels)
            .await
            .map(SnapshotDto::from)
    }

    /// Aggregate statistics for an entity.
    pub async fn get_version_stats(&self, entity_id: Uuid) -> AppResult<VersionStats> {
        self.queries.get_stats(entity_id).await
    }

    /// Versions of an entity carrying `tag`.
    pub async fn find_versions_by_tag(
        &self,
        entity_id: Uuid,
        tag: &str,
    ) -> AppResult<Vec<SnapshotDto>> {
        let found = self.queries.find_by_tag(entity_id, tag).await?;
        Ok(found.into_iter().map(SnapshotDto::from).collect())
    }
}
