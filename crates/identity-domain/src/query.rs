//! Declarative name predicates.
//!
//! Stores translate these into their own query mechanism; the sea-orm stores
//! push them down as SQL, the in-memory double evaluates [`NameMatch::matches`].

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_name;

/// Predicate over a (normalized) name column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "op", content = "value")]
pub enum NameMatch {
    Equals(String),
    StartsWith(String),
}

impl NameMatch {
    pub fn value(&self) -> &str {
        match self {
            Self::Equals(v) | Self::StartsWith(v) => v,
        }
    }

    /// Same predicate with its operand normalized, for matching normalized columns.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Equals(v) => Self::Equals(normalize_name(v)),
            Self::StartsWith(v) => Self::StartsWith(normalize_name(v)),
        }
    }

    /// Whether the operand is already in normalized form. Stores compare
    /// against normalized columns and expect this to hold.
    pub fn is_normalized(&self) -> bool {
        normalize_name(self.value()) == self.value()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Equals(v) => candidate == v,
            Self::StartsWith(v) => candidate.starts_with(v.as_str()),
        }
    }
}
