//! Knowledge document store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_entity::document::{CreateDocument, KnowledgeDocument};
use versa_entity::fields::{FieldSet, VersionedEntity};

use crate::traits::EntityStore;

/// Row store for the `knowledge_documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new knowledge document record.
    pub async fn create(&self, data: &CreateDocument) -> AppResult<KnowledgeDocument> {
        sqlx::query_as::<_, KnowledgeDocument>(
            "INSERT INTO knowledge_documents (title, body, file_path, file_size, mime_type, metadata, category, summary, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.body)
        .bind(&data.file_path)
        .bind(data.file_size)
        .bind(&data.mime_type)
        .bind(&data.metadata)
        .bind(&data.category)
        .bind(&data.summary)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))
    }
}

#[async_trait]
impl EntityStore<KnowledgeDocument> for PgDocumentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<KnowledgeDocument>> {
        sqlx::query_as::<_, KnowledgeDocument>("SELECT * FROM knowledge_documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn write_fields(
        &self,
        id: Uuid,
        fields: &FieldSet,
        actor_id: i64,
    ) -> AppResult<KnowledgeDocument> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut document = sqlx::query_as::<_, KnowledgeDocument>(
            "SELECT * FROM knowledge_documents WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;

        document.restore(fields)?;
        document.touch(actor_id, Utc::now());

        let updated = sqlx::query_as::<_, KnowledgeDocument>(
            "UPDATE knowledge_documents SET title = $2, body = $3, file_path = $4, file_size = $5, \
             mime_type = $6, metadata = $7, category = $8, summary = $9, \
             modified_by = $10, updated_at = $11 \
             WHERE id = $1 RETURNING *",
        )
        .bind(document.id)
        .bind(&document.title)
        .bind(&document.body)
        .bind(&document.file_path)
        .bind(document.file_size)
        .bind(&document.mime_type)
        .bind(&document.metadata)
        .bind(&document.category)
        .bind(&document.summary)
        .bind(document.modified_by)
        .bind(document.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update document", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit document update", e)
        })?;

        Ok(updated)
    }

    async fn advance_version(&self, id: Uuid, version: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE knowledge_documents SET current_version = GREATEST(current_version, $2) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(version)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to advance document version", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Document {id} not found")));
        }
        Ok(())
    }
}
