//! Core traits shared by the service layer.

pub mod service;

pub use service::Service;
