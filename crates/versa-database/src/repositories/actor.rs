//! Actor directory backed by the `users` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use versa_core::error::{AppError, ErrorKind};
use versa_core::result::AppResult;
use versa_entity::actor::ActorProfile;

use crate::traits::ActorDirectory;

/// Reads display names from the host application's `users` table.
#[derive(Debug, Clone)]
pub struct PgActorDirectory {
    pool: PgPool,
}

impl PgActorDirectory {
    /// Create a new actor directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorDirectory for PgActorDirectory {
    async fn display_names(&self, ids: &[i64]) -> AppResult<HashMap<i64, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, ActorProfile>(
            "SELECT id, display_name FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve actors", e))?;

        Ok(profiles
            .into_iter()
            .map(|p| (p.id, p.display_name))
            .collect())
    }
}
