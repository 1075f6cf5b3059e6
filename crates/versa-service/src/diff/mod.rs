//! Field-level structural diffing.

pub mod canonical;
pub mod engine;

pub use canonical::canonical_json;
pub use engine::{DiffEngine, changed_fields_map};
