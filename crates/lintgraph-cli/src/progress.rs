//! Terminal progress: an `indicatif` bar over units plus Cargo-style status
//! lines for notable events.

use indicatif::ProgressBar;

use lintgraph_analyze::{ProgressEvent, ProgressSink};
use lintgraph_core::result::Severity;
use lintgraph_util::progress::{progress_bar, status, status_info, status_warn};

pub struct CliProgress {
    bar: ProgressBar,
    verbose: bool,
}

impl CliProgress {
    pub fn new(verbose: bool) -> Self {
        Self {
            bar: progress_bar(0, "Analyzing"),
            verbose,
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Print a status line without tearing the bar.
    fn line(&self, print: impl FnOnce()) {
        self.bar.suspend(print);
    }
}

impl ProgressSink for CliProgress {
    fn notify(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total, completed } => {
                self.bar.set_length(total as u64);
                self.bar.set_position(completed as u64);
            }
            ProgressEvent::UnitStarted { unit } => {
                self.bar.set_message(unit);
            }
            ProgressEvent::PassStarted { unit, pass } => {
                if self.verbose {
                    self.line(|| status("Analyzing", &format!("{unit} ({pass})")));
                }
            }
            ProgressEvent::FindingReported {
                unit,
                category,
                severity,
                ..
            } => {
                if severity == Severity::Critical {
                    self.line(|| status_warn("Critical", &format!("{category} issue in {unit}")));
                }
            }
            ProgressEvent::UnitCached { unit } => {
                if self.verbose {
                    self.line(|| status_info("Cached", &unit));
                }
            }
            ProgressEvent::UnitFinished { .. } => self.bar.inc(1),
            ProgressEvent::Checkpointed { completed } => {
                if self.verbose {
                    self.line(|| status_info("Saved", &format!("{completed} unit(s)")));
                }
            }
        }
    }
}
