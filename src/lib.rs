//! # Versa
//!
//! Versioned snapshot, diff, and revert engine. Hosts build a [`Versa`]
//! either over PostgreSQL with [`Versa::connect`] or over in-memory stores
//! with [`Versa::in_memory`], then call the per-kind
//! [`VersioningService`](versa_service::VersioningService) operations from
//! their request handlers.

pub mod logging;

use std::sync::Arc;

use tracing::info;

use versa_core::config::{AppConfig, VersioningConfig};
use versa_database::DatabasePool;
use versa_database::memory::{MemoryActorDirectory, MemoryEntityStore, MemorySnapshotRepository};
use versa_database::repositories::{
    PgActorDirectory, PgDocumentStore, PgProposalStore, PgSnapshotRepository,
};
use versa_database::traits::{ActorDirectory, SnapshotRepository};
use versa_entity::document::KnowledgeDocument;
use versa_entity::proposal::Proposal;
use versa_service::{DocumentVersioning, ProposalVersioning, VersioningService};

pub use versa_core::{AppError, AppResult, ErrorKind};

/// The stores behind a [`Versa`] instance.
#[derive(Debug, Clone)]
pub enum Stores {
    /// PostgreSQL-backed stores sharing one pool.
    Postgres {
        /// Connection pool.
        pool: DatabasePool,
        /// Proposal rows.
        proposals: Arc<PgProposalStore>,
        /// Knowledge document rows.
        documents: Arc<PgDocumentStore>,
    },
    /// In-memory stores.
    Memory {
        /// Proposal rows.
        proposals: Arc<MemoryEntityStore<Proposal>>,
        /// Knowledge document rows.
        documents: Arc<MemoryEntityStore<KnowledgeDocument>>,
        /// Snapshot rows of both kinds.
        snapshots: Arc<MemorySnapshotRepository>,
        /// Actor display names.
        actors: Arc<MemoryActorDirectory>,
    },
}

/// Versioning for every supported entity kind.
#[derive(Clone)]
pub struct Versa {
    /// Proposal versioning.
    pub proposals: ProposalVersioning,
    /// Knowledge document versioning.
    pub documents: DocumentVersioning,
    stores: Stores,
}

impl Versa {
    /// Connect to PostgreSQL, apply migrations if configured, and wire the
    /// services.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        let pool = db.pool().clone();

        let proposals = Arc::new(PgProposalStore::new(pool.clone()));
        let documents = Arc::new(PgDocumentStore::new(pool.clone()));
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(PgSnapshotRepository::new(pool.clone()));
        let actors: Arc<dyn ActorDirectory> = Arc::new(PgActorDirectory::new(pool));

        let versa = Self {
            proposals: VersioningService::new(
                proposals.clone(),
                Arc::clone(&snapshots),
                Some(Arc::clone(&actors)),
                &config.versioning,
            ),
            documents: VersioningService::new(
                documents.clone(),
                snapshots,
                Some(actors),
                &config.versioning,
            ),
            stores: Stores::Postgres {
                pool: db,
                proposals,
                documents,
            },
        };

        info!("Versa ready on PostgreSQL");
        Ok(versa)
    }

    /// Wire the services over fresh in-memory stores.
    pub fn in_memory(config: &VersioningConfig) -> Self {
        let proposals = Arc::new(MemoryEntityStore::<Proposal>::new());
        let documents = Arc::new(MemoryEntityStore::<KnowledgeDocument>::new());
        let snapshots = Arc::new(MemorySnapshotRepository::new());
        let actors = Arc::new(MemoryActorDirectory::new());
        let directory: Arc<dyn ActorDirectory> = actors.clone();

        let versa = Self {
            proposals: VersioningService::new(
                proposals.clone(),
                snapshots.clone(),
                Some(Arc::clone(&directory)),
                config,
            ),
            documents: VersioningService::new(
                documents.clone(),
                snapshots.clone(),
                Some(directory),
                config,
            ),
            stores: Stores::Memory {
                proposals,
                documents,
                snapshots,
                actors,
            },
        };

        info!("Versa ready on in-memory stores");
        versa
    }

    /// The underlying stores, for creating and editing live entities.
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Release database connections. A no-op for in-memory stores.
    pub async fn close(&self) {
        if let Stores::Postgres { pool, .. } = &self.stores {
            pool.close().await;
        }
    }
}
