//! Test utilities for the identity stores.
//!
//! `TestDatabase` gives each test its own migrated in-memory SQLite database;
//! the builders produce unique users and roles so tests never collide.
//! Import from tests only, never from production code.

pub mod assertions;
pub mod builders;
pub mod fixture;
