//! Open set of additional row fields.
//!
//! Base rows carry an empty map. Store hooks fill it (an `issuer` on a claim,
//! a `context` on a login) and the store persists it next to the base columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extension fields of a row, keyed by field name.
///
/// Backed by a `BTreeMap`, so the JSON encoding is canonical: two maps with the
/// same entries always encode to the same string. Stores rely on this to
/// compare extensions with a plain column equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(BTreeMap<String, Value>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field. `null` values are dropped so that an absent optional
    /// field and an explicit `None` encode identically.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Null => {
                self.0.remove(&key);
            }
            value => {
                self.0.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Canonical JSON text, as stored in the `extensions` column.
    pub fn to_json_string(&self) -> String {
        // A map of string keys to JSON values always serializes.
        serde_json::to_string(&self.0).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(s)
    }
}

impl FromIterator<(String, Value)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut ext = Self::default();
        for (k, v) in iter {
            ext.insert(k, v);
        }
        ext
    }
}
