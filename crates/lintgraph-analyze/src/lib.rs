//! The lintgraph analysis pipeline.
//!
//! - [`normalize`] / [`response`]: repair and strictly decode oracle output
//! - [`schema`]: JSON schemas constraining oracle output
//! - [`prompt`]: render pass prompts for a unit
//! - [`locate`]: map quoted code back to a source line
//! - [`analyzer`]: run every pass for one unit, with caching
//! - [`scheduler`]: drive units in dependency order, checkpoint, resume
//! - [`checkpoint`]: durable run state

pub mod analyzer;
pub mod checkpoint;
pub mod locate;
pub mod normalize;
pub mod progress;
pub mod prompt;
pub mod response;
pub mod scheduler;
pub mod schema;

pub use analyzer::Analyzer;
pub use progress::{ProgressEvent, ProgressSink};
pub use scheduler::{RunContext, RunOutcome, Scheduler};
