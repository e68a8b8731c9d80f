//! Printer status model
//!
//! The host reports printer objects (heaters, pins, fans, print statistics)
//! as a nested JSON mapping. The first query returns the full mapping and
//! every later notification carries only the fields that changed, which are
//! folded in with [`merge_patch`].

use crate::error::StatusError;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Nested status mapping as reported by the host
pub type StatusMap = Map<String, Value>;

/// Shared handle to the canonical status store
pub type SharedStatus = Arc<RwLock<StatusStore>>;

/// Deep, right-biased union of `patch` into `target`.
///
/// Nested mappings present on both sides are merged recursively; any other
/// value in `patch` replaces (or adds) the key in `target`. Keys are never
/// removed.
pub fn merge_patch(target: &mut StatusMap, patch: &StatusMap) {
    for (key, incoming) in patch {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_patch(existing, nested),
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Canonical printer status
///
/// Mutated only through [`StatusStore::merge_patch`] and
/// [`StatusStore::replace`]; readers take a [`StatusSnapshot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusStore {
    status: StatusMap,
}

impl StatusStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store wrapped in a shared lock
    pub fn shared() -> SharedStatus {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Apply a partial update
    pub fn merge_patch(&mut self, patch: &StatusMap) {
        merge_patch(&mut self.status, patch);
    }

    /// Replace the whole status with a fresh query result
    pub fn replace(&mut self, status: StatusMap) {
        self.status = status;
    }

    /// Look up one printer object
    pub fn object(&self, name: &str) -> Option<&Value> {
        self.status.get(name)
    }

    /// Borrow the raw mapping
    pub fn as_map(&self) -> &StatusMap {
        &self.status
    }

    /// Take an immutable copy for downstream consumers
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from(self.status.clone())
    }
}

/// Read-only copy of the status store
///
/// Cheap to clone. Accessors fail with [`StatusError`] when a field is absent
/// or has the wrong type, so that a render pass can abort with `?`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot(Arc<StatusMap>);

impl From<StatusMap> for StatusSnapshot {
    fn from(map: StatusMap) -> Self {
        Self(Arc::new(map))
    }
}

impl StatusSnapshot {
    /// Borrow the raw mapping
    pub fn as_map(&self) -> &StatusMap {
        &self.0
    }

    /// Look up one printer object, if present
    pub fn get(&self, object: &str) -> Option<&Value> {
        self.0.get(object)
    }

    /// Look up a field of a printer object
    pub fn value(&self, object: &str, field: &str) -> Result<&Value, StatusError> {
        self.0
            .get(object)
            .and_then(|obj| obj.get(field))
            .ok_or_else(|| StatusError::MissingField {
                path: format!("{object}.{field}"),
            })
    }

    /// Read a numeric field
    pub fn f64(&self, object: &str, field: &str) -> Result<f64, StatusError> {
        self.value(object, field)?
            .as_f64()
            .ok_or_else(|| StatusError::InvalidField {
                path: format!("{object}.{field}"),
                expected: "a number",
            })
    }

    /// Read a string field
    pub fn str(&self, object: &str, field: &str) -> Result<&str, StatusError> {
        self.value(object, field)?
            .as_str()
            .ok_or_else(|| StatusError::InvalidField {
                path: format!("{object}.{field}"),
                expected: "a string",
            })
    }

    /// Read one element of a numeric array field
    pub fn f64_at(&self, object: &str, field: &str, index: usize) -> Result<f64, StatusError> {
        self.value(object, field)?
            .get(index)
            .and_then(Value::as_f64)
            .ok_or_else(|| StatusError::InvalidField {
                path: format!("{object}.{field}[{index}]"),
                expected: "a number",
            })
    }

    /// Read a numeric field that may legitimately be absent or null
    pub fn optional_f64(&self, object: &str, field: &str) -> Option<f64> {
        self.0
            .get(object)
            .and_then(|obj| obj.get(field))
            .and_then(Value::as_f64)
    }
}

/// Printer objects the UI subscribes to
///
/// Maps an object name to the fields of interest; `None` requests every
/// field. Fixed once the UI is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    objects: BTreeMap<String, Option<Vec<String>>>,
}

impl SubscriptionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to specific fields of an object
    pub fn with(mut self, object: impl Into<String>, fields: &[&str]) -> Self {
        self.objects.insert(
            object.into(),
            Some(fields.iter().map(|f| f.to_string()).collect()),
        );
        self
    }

    /// Subscribe to every field of an object
    pub fn with_all(mut self, object: impl Into<String>) -> Self {
        self.objects.insert(object.into(), None);
        self
    }

    /// Number of subscribed objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object names in the set
    pub fn objects(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Encode as the `objects` parameter of subscribe and query calls
    pub fn to_params(&self) -> Value {
        let objects: Map<String, Value> = self
            .objects
            .iter()
            .map(|(name, fields)| {
                let fields = match fields {
                    Some(fields) => Value::from(fields.clone()),
                    None => Value::Null,
                };
                (name.clone(), fields)
            })
            .collect();
        Value::Object(objects)
    }
}
