//! Role domain types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named role users can be placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub normalized_name: String,
    pub concurrency_stamp: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            normalized_name: String::new(),
            concurrency_stamp: String::new(),
        }
    }
}
