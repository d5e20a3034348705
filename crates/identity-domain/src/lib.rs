//! Entity model shared by every identity store.
//!
//! This crate contains only pure types with no ORM dependencies.
//! Stores map these records onto rows; managers and tests consume them directly.

pub mod claim;
pub mod extensions;
pub mod login;
pub mod normalize;
pub mod pagination;
pub mod query;
pub mod result;
pub mod role;
pub mod user;
