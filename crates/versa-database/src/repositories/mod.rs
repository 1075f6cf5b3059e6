//! PostgreSQL repository implementations.

pub mod actor;
pub mod document;
pub mod proposal;
pub mod snapshot;

pub use actor::PgActorDirectory;
pub use document::PgDocumentStore;
pub use proposal::PgProposalStore;
pub use snapshot::PgSnapshotRepository;
