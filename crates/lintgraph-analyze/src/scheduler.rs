//! Dependency-ordered driver over analysis units.
//!
//! Units are processed in the order the condenser produced them, so every
//! unit's dependencies are recorded before it starts. Units already present
//! in the run state are skipped, which is all resuming takes. The state is
//! checkpointed every `checkpoint_every` completed units, at the end of the
//! run, and before any fatal error or cancellation is returned.
//!
//! With `jobs > 1` the units of one dependency layer run concurrently, bounded
//! by a semaphore. Results are folded into the run state by the scheduler
//! task alone, as each unit finishes.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use lintgraph_core::result::Summary;
use lintgraph_core::state::RunState;
use lintgraph_core::unit::AnalysisUnit;
use lintgraph_graph::unit_graph::UnitGraph;
use lintgraph_util::errors::{LintError, LintResult};

use crate::analyzer::{Analyzer, UnitOutcome};
use crate::checkpoint;
use crate::progress::{NoProgress, ProgressEvent, ProgressSink};

/// Per-run collaborators the scheduler reports to and is steered by.
#[derive(Clone)]
pub struct RunContext {
    pub progress: Arc<dyn ProgressSink>,
    pub cancel: CancellationToken,
    /// Where checkpoints go. `None` keeps the state in memory only.
    pub state_path: Option<PathBuf>,
    /// Checkpoint after this many newly completed units.
    pub checkpoint_every: usize,
}

impl RunContext {
    pub fn new(state_path: Option<PathBuf>, checkpoint_every: usize) -> Self {
        Self {
            progress: Arc::new(NoProgress),
            cancel: CancellationToken::new(),
            state_path,
            checkpoint_every: checkpoint_every.max(1),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Units whose passes ran against the oracle.
    pub analyzed: usize,
    /// Units already present in the run state at start.
    pub skipped: usize,
    /// Units served from the cache.
    pub cache_hits: usize,
}

pub struct Scheduler {
    analyzer: Arc<Analyzer>,
    jobs: usize,
}

impl Scheduler {
    pub fn new(analyzer: Arc<Analyzer>, jobs: usize) -> Self {
        Self {
            analyzer,
            jobs: jobs.max(1),
        }
    }

    /// Process every unit not yet in `state`, in dependency order.
    ///
    /// `units` must be in the order produced by the condenser.
    pub async fn run(
        &self,
        units: &[AnalysisUnit],
        state: &mut RunState,
        ctx: &RunContext,
    ) -> LintResult<RunOutcome> {
        state.metadata.total_units = units.len();
        ctx.progress.notify(ProgressEvent::RunStarted {
            total: units.len(),
            completed: units.iter().filter(|u| state.contains(&u.id)).count(),
        });

        let mut run = Run {
            state,
            ctx,
            outcome: RunOutcome::default(),
            since_checkpoint: 0,
        };
        let result = if self.jobs > 1 {
            self.run_layers(units, &mut run).await
        } else {
            self.run_sequential(units, &mut run).await
        };

        match result {
            Ok(()) => {
                run.checkpoint()?;
                Ok(run.outcome)
            }
            Err(e) => {
                if let Err(ce) = run.checkpoint() {
                    tracing::warn!("Failed to checkpoint after error: {ce}");
                }
                Err(e)
            }
        }
    }

    async fn run_sequential(&self, units: &[AnalysisUnit], run: &mut Run<'_>) -> LintResult<()> {
        for unit in units {
            if run.state.contains(&unit.id) {
                run.outcome.skipped += 1;
                continue;
            }
            if run.ctx.cancel.is_cancelled() {
                return Err(LintError::Cancelled.into());
            }

            run.ctx.progress.notify(ProgressEvent::UnitStarted {
                unit: unit.id.clone(),
            });
            let deps = dependency_summaries(unit, run.state)?;
            let outcome = self
                .analyzer
                .analyze(unit, &deps, run.ctx.progress.as_ref())
                .await?;
            run.record(&unit.id, outcome)?;
        }
        Ok(())
    }

    async fn run_layers(&self, units: &[AnalysisUnit], run: &mut Run<'_>) -> LintResult<()> {
        let graph = UnitGraph::from_units(units);
        let semaphore = Arc::new(Semaphore::new(self.jobs));

        for layer in graph.layers() {
            let layer_len = layer.len();
            let pending: Vec<&AnalysisUnit> = layer
                .into_iter()
                .filter(|u| !run.state.contains(&u.id))
                .collect();
            run.outcome.skipped += layer_len - pending.len();
            if pending.is_empty() {
                continue;
            }
            if run.ctx.cancel.is_cancelled() {
                return Err(LintError::Cancelled.into());
            }

            let mut join_set = JoinSet::new();
            for unit in pending {
                let deps = dependency_summaries(unit, run.state)?;
                let analyzer = Arc::clone(&self.analyzer);
                let progress = Arc::clone(&run.ctx.progress);
                let sem = Arc::clone(&semaphore);
                let unit = unit.clone();
                join_set.spawn(async move {
                    let outcome = match sem.acquire_owned().await {
                        Ok(_permit) => {
                            progress.notify(ProgressEvent::UnitStarted {
                                unit: unit.id.clone(),
                            });
                            analyzer.analyze(&unit, &deps, progress.as_ref()).await
                        }
                        Err(e) => Err(LintError::Generic {
                            message: format!("Scheduler semaphore closed: {e}"),
                        }
                        .into()),
                    };
                    (unit.id, outcome)
                });
            }

            // Every in-flight unit is allowed to finish and is recorded; the
            // first failure is returned once the layer has drained.
            let mut first_error = None;
            while let Some(joined) = join_set.join_next().await {
                let failure = match joined {
                    Ok((id, Ok(outcome))) => run.record(&id, outcome).err(),
                    Ok((id, Err(e))) => {
                        tracing::warn!("Unit {id} failed: {e}");
                        Some(e)
                    }
                    Err(e) => Some(
                        LintError::Generic {
                            message: format!("Analysis task failed: {e}"),
                        }
                        .into(),
                    ),
                };
                if first_error.is_none() {
                    first_error = failure;
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Mutable bookkeeping for one scheduler run.
struct Run<'a> {
    state: &'a mut RunState,
    ctx: &'a RunContext,
    outcome: RunOutcome,
    since_checkpoint: usize,
}

impl Run<'_> {
    fn record(&mut self, unit_id: &str, outcome: UnitOutcome) -> LintResult<()> {
        if outcome.is_cached() {
            self.outcome.cache_hits += 1;
            self.state.metadata.cache_hits += 1;
        } else {
            self.outcome.analyzed += 1;
        }
        let result = outcome.into_result();
        let findings = result.findings.len();
        self.state.record(unit_id, result);
        tracing::info!("Completed {unit_id} ({findings} finding(s))");
        self.ctx.progress.notify(ProgressEvent::UnitFinished {
            unit: unit_id.to_string(),
            findings,
        });

        self.since_checkpoint += 1;
        if self.since_checkpoint >= self.ctx.checkpoint_every {
            self.checkpoint()?;
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> LintResult<()> {
        self.since_checkpoint = 0;
        let Some(path) = &self.ctx.state_path else {
            return Ok(());
        };
        checkpoint::save(path, self.state)?;
        tracing::debug!(
            "Checkpointed {} unit(s) to {}",
            self.state.completed(),
            path.display()
        );
        self.ctx.progress.notify(ProgressEvent::Checkpointed {
            completed: self.state.completed(),
        });
        Ok(())
    }
}

/// Summaries of `unit`'s dependencies, in `unit.dependencies` order.
fn dependency_summaries(unit: &AnalysisUnit, state: &RunState) -> LintResult<Vec<(String, Summary)>> {
    unit.dependencies
        .iter()
        .map(|dep| {
            state
                .summary(dep)
                .map(|s| (dep.clone(), s.clone()))
                .ok_or_else(|| {
                    LintError::Generic {
                        message: format!("Unit {} scheduled before its dependency {dep}", unit.id),
                    }
                    .into()
                })
        })
        .collect()
}
