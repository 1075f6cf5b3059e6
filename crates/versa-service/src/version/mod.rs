//! Snapshot versioning: allocation, capture, revert, and history reads.

pub mod allocator;
pub mod query;
pub mod revert;
pub mod snapshot;

pub use allocator::{Allocation, RetryPolicy, VersionAllocator};
pub use query::{HistoryEntry, QueryService, SnapshotDetail};
pub use revert::{RevertOutcome, RevertService, RevertTarget};
pub use snapshot::{SnapshotRequest, SnapshotService};
