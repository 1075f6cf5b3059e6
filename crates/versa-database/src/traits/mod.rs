//! Storage contracts consumed by the versioning services.

pub mod actor;
pub mod entity;
pub mod snapshot;

pub use actor::ActorDirectory;
pub use entity::EntityStore;
pub use snapshot::SnapshotRepository;
