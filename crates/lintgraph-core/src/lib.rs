//! Core data types for lintgraph.
//!
//! This crate defines the vocabulary shared by every stage of an analysis
//! run: extracted functions and their external callees, analysis units,
//! oracle-derived summaries and findings, the resumable run state, and the
//! run configuration.
//!
//! This crate is intentionally free of async code and network I/O.

/// Schema version written into every run-state checkpoint.
pub const STATE_VERSION: u32 = 1;

pub mod config;
pub mod extraction;
pub mod function;
pub mod result;
pub mod state;
pub mod template;
pub mod unit;
