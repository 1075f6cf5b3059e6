//! # versa-entity
//!
//! Domain models for Versa. The live entities ([`Proposal`],
//! [`KnowledgeDocument`]) are the mutable rows owned by the host
//! application; [`Snapshot`] is the immutable version record captured from
//! them. Database entities derive `sqlx::FromRow`.

pub mod actor;
pub mod document;
pub mod fields;
pub mod kind;
pub mod proposal;
pub mod snapshot;

pub use actor::ActorProfile;
pub use document::KnowledgeDocument;
pub use fields::{FieldSet, VersionedEntity};
pub use kind::EntityKind;
pub use proposal::{Proposal, ProposalStatus};
pub use snapshot::{ChangeType, FieldDiff, NewSnapshot, Snapshot, SnapshotLabels, VersionStats};
