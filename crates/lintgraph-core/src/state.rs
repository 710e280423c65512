//! Resumable run state and the result accumulator that mutates it.
//!
//! `RunState` is a plain serializable record: completed unit results keyed by
//! unit id plus running aggregates. It is the checkpoint format, the resume
//! input, and the hand-off to report renderers. All maps are `BTreeMap`s so
//! the serialized form is stable across runs and processes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result::{Severity, Summary, UnitResult};

/// Descriptive metadata about the run that produced a state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unix timestamp (seconds) of the run start.
    pub generated_at: u64,
    pub total_units: usize,
    pub cache_hits: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
}

/// Running issue counts over all recorded units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total_issues: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Units with at least one critical finding, in recording order.
    pub critical_units: Vec<String>,
}

/// The resumable record of every unit completed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub version: u32,
    pub metadata: Metadata,
    pub units: BTreeMap<String, UnitResult>,
    pub aggregate: Aggregate,
}

impl RunState {
    /// Create an empty state for a run over `total_units` units.
    pub fn new(total_units: usize) -> Self {
        Self {
            version: crate::STATE_VERSION,
            metadata: Metadata {
                generated_at: unix_now(),
                total_units,
                cache_hits: 0,
                config_file: None,
            },
            units: BTreeMap::new(),
            aggregate: Aggregate::default(),
        }
    }

    /// Returns `true` if a result for `unit_id` has been recorded.
    pub fn contains(&self, unit_id: &str) -> bool {
        self.units.contains_key(unit_id)
    }

    /// Summary of a completed unit, if recorded.
    pub fn summary(&self, unit_id: &str) -> Option<&Summary> {
        self.units.get(unit_id).map(|r| &r.summary)
    }

    /// Number of completed units.
    pub fn completed(&self) -> usize {
        self.units.len()
    }

    /// Record a completed unit and fold its findings into the aggregates.
    ///
    /// Must be called at most once per unit id per run; re-recording an id is
    /// a caller bug.
    pub fn record(&mut self, unit_id: &str, result: UnitResult) {
        debug_assert!(
            !self.units.contains_key(unit_id),
            "unit {unit_id} recorded twice"
        );

        for finding in &result.findings {
            self.aggregate.total_issues += 1;
            *self
                .aggregate
                .by_severity
                .entry(finding.severity.as_str().to_string())
                .or_default() += 1;
            *self
                .aggregate
                .by_category
                .entry(finding.category.clone())
                .or_default() += 1;

            if finding.severity == Severity::Critical
                && !self.aggregate.critical_units.iter().any(|u| u == unit_id)
            {
                self.aggregate.critical_units.push(unit_id.to_string());
            }
        }

        self.units.insert(unit_id.to_string(), result);
    }

    /// Count of findings at the given severity.
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.aggregate
            .by_severity
            .get(severity.as_str())
            .copied()
            .unwrap_or(0)
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
