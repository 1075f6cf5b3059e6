//! In-memory actor directory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use versa_core::result::AppResult;

use crate::traits::ActorDirectory;

/// Display names registered up front.
#[derive(Debug, Clone, Default)]
pub struct MemoryActorDirectory {
    names: Arc<RwLock<HashMap<i64, String>>>,
}

impl MemoryActorDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rename an actor.
    pub async fn register(&self, id: i64, display_name: impl Into<String>) {
        self.names.write().await.insert(id, display_name.into());
    }
}

#[async_trait]
impl ActorDirectory for MemoryActorDirectory {
    async fn display_names(&self, ids: &[i64]) -> AppResult<HashMap<i64, String>> {
        let names = self.names.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| names.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}
