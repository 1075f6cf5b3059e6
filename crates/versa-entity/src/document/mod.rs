//! Knowledge-base document entities.

pub mod model;

pub use model::{CreateDocument, KnowledgeDocument};
