//! In-memory snapshot repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use versa_core::error::AppError;
use versa_core::result::AppResult;
use versa_core::types::HistoryPage;
use versa_entity::kind::EntityKind;
use versa_entity::snapshot::{NewSnapshot, Snapshot, SnapshotLabels, VersionStats};

use crate::traits::SnapshotRepository;

/// Snapshot rows held in a mutex-protected map.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotRepository {
    rows: Arc<Mutex<HashMap<Uuid, Snapshot>>>,
}

impl MemorySnapshotRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_desc(rows: &HashMap<Uuid, Snapshot>, kind: EntityKind, entity_id: Uuid) -> Vec<Snapshot> {
    let mut matching: Vec<Snapshot> = rows
        .values()
        .filter(|s| s.entity_kind == kind && s.entity_id == entity_id)
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.version.cmp(&a.version));
    matching
}

#[async_trait]
impl SnapshotRepository for MemorySnapshotRepository {
    async fn insert(&self, snapshot: &NewSnapshot) -> AppResult<Snapshot> {
        let mut rows = self.rows.lock().await;

        let duplicate = rows.values().any(|s| {
            s.entity_kind == snapshot.entity_kind
                && s.entity_id == snapshot.entity_id
                && s.version == snapshot.version
        });
        if duplicate {
            debug!(
                entity_id = %snapshot.entity_id,
                version = snapshot.version,
                "Rejected duplicate snapshot version"
            );
            return Err(AppError::conflict(format!(
                "Version {} of {} {} already exists",
                snapshot.version, snapshot.entity_kind, snapshot.entity_id
            )));
        }

        let stored = snapshot.clone().into_snapshot(Uuid::new_v4(), Utc::now());
        rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Snapshot>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn find_version(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        version: i32,
    ) -> AppResult<Option<Snapshot>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .find(|s| s.entity_kind == kind && s.entity_id == entity_id && s.version == version)
            .cloned())
    }

    async fn find_latest(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<Option<Snapshot>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|s| s.entity_kind == kind && s.entity_id == entity_id)
            .max_by_key(|s| s.version)
            .cloned())
    }

    async fn list(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        page: HistoryPage,
    ) -> AppResult<Vec<Snapshot>> {
        let rows = self.rows.lock().await;
        Ok(sorted_desc(&rows, kind, entity_id)
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn find_by_tag(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        tag: &str,
    ) -> AppResult<Vec<Snapshot>> {
        let rows = self.rows.lock().await;
        Ok(sorted_desc(&rows, kind, entity_id)
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect())
    }

    async fn count(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<u64> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|s| s.entity_kind == kind && s.entity_id == entity_id)
            .count() as u64)
    }

    async fn stats(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<VersionStats> {
        let rows = self.rows.lock().await;
        let matching = sorted_desc(&rows, kind, entity_id);

        let total = matching.len() as u64;
        let major = matching.iter().filter(|s| s.is_major).count() as u64;
        let contributors: HashSet<i64> = matching.iter().map(|s| s.created_by_id).collect();

        Ok(VersionStats {
            total_versions: total,
            major_versions: major,
            minor_versions: total - major,
            last_modified: matching.iter().map(|s| s.created_at).max(),
            contributor_count: contributors.len() as u64,
        })
    }

    async fn update_labels(&self, id: Uuid, labels: &SnapshotLabels) -> AppResult<Snapshot> {
        let mut rows = self.rows.lock().await;
        let snapshot = rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Snapshot {id} not found")))?;
        labels.apply(snapshot);
        Ok(snapshot.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.rows.lock().await.remove(&id).is_some())
    }
}
