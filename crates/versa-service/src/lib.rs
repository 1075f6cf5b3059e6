//! # versa-service
//!
//! Versioning services for Versa. The [`SnapshotService`] captures
//! immutable versions of a live entity, the [`RevertService`] restores a
//! historical version without rewriting history, and the [`QueryService`]
//! answers history, comparison, and statistics reads. [`VersioningService`]
//! bundles the three behind the inbound operations host request handlers
//! call.
//!
//! Services follow constructor injection: every store is provided at
//! construction time via `Arc` references, and all services are generic
//! over the [`VersionedEntity`](versa_entity::VersionedEntity) they manage.

pub mod diff;
pub mod version;
pub mod versioning;

pub use diff::DiffEngine;
pub use version::{
    Allocation, HistoryEntry, QueryService, RetryPolicy, RevertOutcome, RevertService,
    RevertTarget, SnapshotDetail, SnapshotRequest, SnapshotService, VersionAllocator,
};
pub use versioning::{ComparisonDto, HistoryItemDto, SnapshotDto, VersioningService};

use versa_entity::document::KnowledgeDocument;
use versa_entity::proposal::Proposal;

/// Versioning for content proposals.
pub type ProposalVersioning = VersioningService<Proposal>;

/// Versioning for knowledge-base documents.
pub type DocumentVersioning = VersioningService<KnowledgeDocument>;
