//! Identity stores: capability traits, sea-orm and in-memory implementations,
//! and the user/role manager harness that drives them.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod usecase;
