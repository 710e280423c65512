//! Progress notifications emitted while a run is in flight.

use lintgraph_core::result::Severity;

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The run is about to process `total` units, `completed` of which are
    /// already done from a previous run.
    RunStarted { total: usize, completed: usize },
    /// A unit was picked up.
    UnitStarted { unit: String },
    /// A pass is about to be submitted to the oracle.
    PassStarted { unit: String, pass: String },
    /// A finding pass reported an issue.
    FindingReported {
        unit: String,
        pass: String,
        category: String,
        severity: Severity,
    },
    /// A unit was served from the cache.
    UnitCached { unit: String },
    /// A unit's result was recorded.
    UnitFinished { unit: String, findings: usize },
    /// The run state was persisted.
    Checkpointed { completed: usize },
}

/// Receiver of progress notifications, owned by the run context.
///
/// Called from the scheduler's task(s); implementations must be cheap and
/// must not block.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _event: ProgressEvent) {}
}

/// Records every event, for tests and golden output.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn notify(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
