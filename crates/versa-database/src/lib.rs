//! # versa-database
//!
//! Storage contracts for the versioning engine ([`EntityStore`],
//! [`SnapshotRepository`], [`ActorDirectory`]) together with PostgreSQL
//! implementations and in-memory implementations for tests and embedded
//! hosts.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use traits::{ActorDirectory, EntityStore, SnapshotRepository};
