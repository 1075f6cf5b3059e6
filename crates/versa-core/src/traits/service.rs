//! Service marker trait.

/// Marker trait for versioning services.
///
/// Every service in `versa-service` implements this trait so hosts can
/// hold them behind `Arc` and share them across request workers.
pub trait Service: Send + Sync + 'static {}
