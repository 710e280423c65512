//! Shared utilities for lintgraph.
//!
//! This crate provides cross-cutting concerns used by all other lintgraph
//! crates: the unified error type, content hashing, filesystem helpers, and
//! terminal status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
