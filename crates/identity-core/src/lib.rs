//! Shared plumbing for identity stores: database config and connection,
//! tracing setup, and sea-orm query extensions.

pub mod config;
pub mod db;
pub mod sea_ext;
pub mod tracing;
