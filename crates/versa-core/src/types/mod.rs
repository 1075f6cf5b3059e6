//! Core type definitions used across the Versa workspace.

pub mod pagination;

pub use pagination::HistoryPage;
