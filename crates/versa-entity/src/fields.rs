//! Tracked-field capture and restore.
//!
//! A [`FieldSet`] is the JSON projection of an entity's tracked fields. It is
//! what a snapshot stores in `snapshot_data`, what the diff engine compares,
//! and what a revert writes back. A missing key and a JSON `null` both mean
//! the field is absent.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use versa_core::{AppError, AppResult};

use crate::kind::EntityKind;

/// Tracked field name to captured value.
pub type FieldSet = BTreeMap<String, Value>;

/// The capability set a live entity exposes to the versioning engine.
///
/// Implemented once per business object; the snapshot, diff, revert, and
/// query services are generic over it.
pub trait VersionedEntity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Which snapshot partition this entity writes to.
    const KIND: EntityKind;

    /// Fields captured in snapshots and compared by the diff engine, in
    /// the order diffs are reported.
    const TRACKED_FIELDS: &'static [&'static str];

    /// The entity's primary key.
    fn id(&self) -> Uuid;

    /// Latest snapshot version recorded for this entity (0 before the first).
    fn current_version(&self) -> i32;

    /// Set the version pointer.
    fn set_current_version(&mut self, version: i32);

    /// Capture the tracked fields.
    fn capture(&self) -> FieldSet;

    /// Overwrite the tracked fields from a captured set.
    ///
    /// Fails without modifying `self` when a required field is missing or a
    /// value has the wrong shape.
    fn restore(&mut self, fields: &FieldSet) -> AppResult<()>;

    /// Record who last modified the entity and when.
    fn touch(&mut self, actor_id: i64, at: DateTime<Utc>);
}

/// Convert an optional value into a JSON value, `None` becoming `null`.
pub fn to_field<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Read a required field.
pub fn required<T: DeserializeOwned>(fields: &FieldSet, name: &str) -> AppResult<T> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(AppError::validation(format!(
            "Snapshot field '{name}' is missing"
        ))),
        Some(value) => decode(name, value),
    }
}

/// Read an optional field. Missing and `null` both decode to `None`.
pub fn optional<T: DeserializeOwned>(fields: &FieldSet, name: &str) -> AppResult<Option<T>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(name, value).map(Some),
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: &Value) -> AppResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        AppError::validation(format!("Snapshot field '{name}' has an unexpected shape: {e}"))
    })
}
