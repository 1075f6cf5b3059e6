//! In-memory implementations of the storage contracts.
//!
//! Suitable for tests and single-process hosts. Each store keeps its state
//! behind a Tokio mutex, so every operation is atomic with respect to
//! concurrent callers, and the snapshot store enforces the same version
//! uniqueness rule as the database constraint.

pub mod actor;
pub mod entity;
pub mod snapshot;

pub use actor::MemoryActorDirectory;
pub use entity::MemoryEntityStore;
pub use snapshot::MemorySnapshotRepository;
