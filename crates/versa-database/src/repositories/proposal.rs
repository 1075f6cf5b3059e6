//! Proposal store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_entity::fields::{FieldSet, VersionedEntity};
use versa_entity::proposal::{CreateProposal, Proposal};

use crate::traits::EntityStore;

/// Row store for the `proposals` table.
#[derive(Debug, Clone)]
pub struct PgProposalStore {
    pool: PgPool,
}

impl PgProposalStore {
    /// Create a new proposal store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new proposal record.
    pub async fn create(&self, data: &CreateProposal) -> AppResult<Proposal> {
        sqlx::query_as::<_, Proposal>(
            "INSERT INTO proposals (title, content, file_path, file_size, mime_type, metadata, client_name, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.file_path)
        .bind(data.file_size)
        .bind(&data.mime_type)
        .bind(&data.metadata)
        .bind(&data.client_name)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create proposal", e))
    }
}

#[async_trait]
impl EntityStore<Proposal> for PgProposalStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Proposal>> {
        sqlx::query_as::<_, Proposal>("SELECT * FROM proposals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find proposal", e))
    }

    async fn write_fields(&self, id: Uuid, fields: &FieldSet, actor_id: i64) -> AppResult<Proposal> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut proposal =
            sqlx::query_as::<_, Proposal>("SELECT * FROM proposals WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock proposal", e))?
                .ok_or_else(|| AppError::not_found(format!("Proposal {id} not found")))?;

        proposal.restore(fields)?;
        proposal.touch(actor_id, Utc::now());

        let updated = sqlx::query_as::<_, Proposal>(
            "UPDATE proposals SET title = $2, content = $3, file_path = $4, file_size = $5, \
             mime_type = $6, metadata = $7, client_name = $8, status = $9, \
             modified_by = $10, updated_at = $11 \
             WHERE id = $1 RETURNING *",
        )
        .bind(proposal.id)
        .bind(&proposal.title)
        .bind(&proposal.content)
        .bind(&proposal.file_path)
        .bind(proposal.file_size)
        .bind(&proposal.mime_type)
        .bind(&proposal.metadata)
        .bind(&proposal.client_name)
        .bind(proposal.status)
        .bind(proposal.modified_by)
        .bind(proposal.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update proposal", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit proposal update", e)
        })?;

        Ok(updated)
    }

    async fn advance_version(&self, id: Uuid, version: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE proposals SET current_version = GREATEST(current_version, $2) WHERE id = $1",
        )
        .bind(id)
        .bind(version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to advance proposal version", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Proposal {id} not found")));
        }
        Ok(())
    }
}
