//! Snapshot repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_core::types::HistoryPage;
use versa_entity::kind::EntityKind;
use versa_entity::snapshot::{NewSnapshot, Snapshot, SnapshotLabels, VersionStats};

use crate::traits::SnapshotRepository;

/// Name of the `(entity_kind, entity_id, version)` uniqueness constraint.
const VERSION_KEY: &str = "entity_snapshots_version_key";

/// Repository for the `entity_snapshots` table.
#[derive(Debug, Clone)]
pub struct PgSnapshotRepository {
    pool: PgPool,
}

impl PgSnapshotRepository {
    /// Create a new snapshot repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StatsRow {
    total_versions: i64,
    major_versions: i64,
    last_modified: Option<DateTime<Utc>>,
    contributor_count: i64,
}

#[async_trait]
impl SnapshotRepository for PgSnapshotRepository {
    async fn insert(&self, snapshot: &NewSnapshot) -> AppResult<Snapshot> {
        sqlx::query_as::<_, Snapshot>(
            "INSERT INTO entity_snapshots \
             (entity_kind, entity_id, version, label, description, snapshot_data, metadata, tags, \
              is_major, changed_fields, parent_version, created_by_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(snapshot.entity_kind)
        .bind(snapshot.entity_id)
        .bind(snapshot.version)
        .bind(&snapshot.label)
        .bind(&snapshot.description)
        .bind(&snapshot.snapshot_data)
        .bind(&snapshot.metadata)
        .bind(&snapshot.tags)
        .bind(snapshot.is_major)
        .bind(&snapshot.changed_fields)
        .bind(snapshot.parent_version)
        .bind(snapshot.created_by_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(VERSION_KEY) => {
                AppError::conflict(format!(
                    "Version {} of {} {} already exists",
                    snapshot.version, snapshot.entity_kind, snapshot.entity_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert snapshot", e),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Snapshot>> {
        sqlx::query_as::<_, Snapshot>("SELECT * FROM entity_snapshots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find snapshot", e))
    }

    async fn find_version(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        version: i32,
    ) -> AppResult<Option<Snapshot>> {
        sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM entity_snapshots \
             WHERE entity_kind = $1 AND entity_id = $2 AND version = $3",
        )
        .bind(kind)
        .bind(entity_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find snapshot version", e))
    }

    async fn find_latest(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<Option<Snapshot>> {
        sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM entity_snapshots WHERE entity_kind = $1 AND entity_id = $2 \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(kind)
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find latest snapshot", e))
    }

    async fn list(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        page: HistoryPage,
    ) -> AppResult<Vec<Snapshot>> {
        sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM entity_snapshots WHERE entity_kind = $1 AND entity_id = $2 \
             ORDER BY version DESC LIMIT $3 OFFSET $4",
        )
        .bind(kind)
        .bind(entity_id)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list snapshots", e))
    }

    async fn find_by_tag(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        tag: &str,
    ) -> AppResult<Vec<Snapshot>> {
        sqlx::query_as::<_, Snapshot>(
            "SELECT * FROM entity_snapshots \
             WHERE entity_kind = $1 AND entity_id = $2 AND $3 = ANY(tags) \
             ORDER BY version DESC",
        )
        .bind(kind)
        .bind(entity_id)
        .bind(tag)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to search snapshots by tag", e)
        })
    }

    async fn count(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM entity_snapshots WHERE entity_kind = $1 AND entity_id = $2",
        )
        .bind(kind)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count snapshots", e))?;
        Ok(count as u64)
    }

    async fn stats(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<VersionStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT COUNT(*) AS total_versions, \
                    COUNT(*) FILTER (WHERE is_major) AS major_versions, \
                    MAX(created_at) AS last_modified, \
                    COUNT(DISTINCT created_by_id) AS contributor_count \
             FROM entity_snapshots WHERE entity_kind = $1 AND entity_id = $2",
        )
        .bind(kind)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to aggregate snapshot stats", e)
        })?;

        let total = row.total_versions as u64;
        let major = row.major_versions as u64;
        Ok(VersionStats {
            total_versions: total,
            major_versions: major,
            minor_versions: total - major,
            last_modified: row.last_modified,
            contributor_count: row.contributor_count as u64,
        })
    }

    async fn update_labels(&self, id: Uuid, labels: &SnapshotLabels) -> AppResult<Snapshot> {
        sqlx::query_as::<_, Snapshot>(
            "UPDATE entity_snapshots SET label = COALESCE($2, label), \
             description = COALESCE($3, description), tags = COALESCE($4, tags) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&labels.label)
        .bind(&labels.description)
        .bind(&labels.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update snapshot labels", e))?
        .ok_or_else(|| AppError::not_found(format!("Snapshot {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM entity_snapshots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete snapshot", e))?;
        Ok(result.rows_affected() > 0)
    }
}
