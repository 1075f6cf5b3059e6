//! # versa-core
//!
//! Core crate for Versa. Contains configuration schemas, history
//! pagination types, the service marker trait, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Versa crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
