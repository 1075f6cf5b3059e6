//! Actor display-name lookup.

use std::collections::HashMap;

use async_trait::async_trait;

use versa_core::result::AppResult;

/// Resolves snapshot creators to display names for history listings.
#[async_trait]
pub trait ActorDirectory: Send + Sync + 'static {
    /// Look up display names. Unknown ids are omitted from the result.
    async fn display_names(&self, ids: &[i64]) -> AppResult<HashMap<i64, String>>;
}
