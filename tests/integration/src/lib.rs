//! Integration test utilities for the blog core
//!
//! This crate provides helpers for running service-level scenarios
//! against the in-memory store with a manually advanced clock.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
