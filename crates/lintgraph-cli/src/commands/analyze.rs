//! Analyze command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use miette::Result;
use tokio_util::sync::CancellationToken;

use lintgraph_analyze::{checkpoint, Analyzer, RunContext, Scheduler};
use lintgraph_cache::{ContentCache, FsCache};
use lintgraph_core::config::Config;
use lintgraph_core::extraction::Extraction;
use lintgraph_core::result::Severity;
use lintgraph_core::state::RunState;
use lintgraph_oracle::Oracle;
use lintgraph_util::progress::{status, status_info, status_warn};

use crate::progress::CliProgress;

pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: Vec<String>,
    pub resume: bool,
    pub prompts: Option<PathBuf>,
    pub state: Option<PathBuf>,
}

pub async fn exec(opts: AnalyzeOptions, verbose: bool) -> Result<()> {
    let config = Config::load(opts.config.as_deref(), &opts.overrides)?;
    let extraction = Extraction::from_path(&opts.input)?;
    let units = lintgraph_graph::plan_units(&extraction)?;
    status_info(
        "Planned",
        &format!(
            "{} unit(s) from {} function(s)",
            units.len(),
            extraction.functions.len()
        ),
    );

    let state_path = opts.state.unwrap_or_else(|| config.output.state.clone());
    tracing::debug!("Run state file: {}", state_path.display());
    let mut state = if opts.resume {
        match checkpoint::load(&state_path)? {
            Some(state) => {
                status_info(
                    "Resuming",
                    &format!("{} of {} unit(s) already done", state.completed(), units.len()),
                );
                state
            }
            None => {
                status_warn(
                    "Warning",
                    &format!("no run state at {}, starting fresh", state_path.display()),
                );
                RunState::new(units.len())
            }
        }
    } else {
        RunState::new(units.len())
    };
    if let Some(path) = &opts.config {
        state.metadata.config_file = Some(path.display().to_string());
    }

    let oracle: Arc<dyn Oracle> = Arc::from(lintgraph_oracle::from_config(&config.oracle)?);
    let cache: Option<Arc<dyn ContentCache>> = if config.cache.enabled {
        tracing::debug!("Result cache at {}", config.cache.dir.display());
        Some(Arc::new(FsCache::new(config.cache.dir.clone())))
    } else {
        None
    };
    let analyzer = Analyzer::new(
        &config,
        oracle,
        cache,
        extraction.externals.clone(),
        opts.prompts.as_deref(),
    )?;
    if verbose {
        status_info("Passes", &analyzer.pass_names().join(", "));
    }

    let progress = Arc::new(CliProgress::new(verbose));
    let cancel = CancellationToken::new();
    let ctx = RunContext::new(Some(state_path.clone()), config.run.checkpoint_every)
        .with_progress(progress.clone())
        .with_cancel(cancel.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            status_warn("Cancelling", "waiting for in-flight units to finish");
            cancel.cancel();
        }
    });

    let result = Scheduler::new(Arc::new(analyzer), config.run.jobs)
        .run(&units, &mut state, &ctx)
        .await;
    interrupt.abort();
    progress.finish();
    let outcome = result?;

    status(
        "Finished",
        &format!(
            "{} analyzed, {} from cache, {} resumed",
            outcome.analyzed, outcome.cache_hits, outcome.skipped
        ),
    );
    print_tally(&state);
    status_info("Saved", &state_path.display().to_string());
    Ok(())
}

fn print_tally(state: &RunState) {
    println!("Findings: {}", state.aggregate.total_issues);
    for severity in Severity::ALL {
        println!("  {:<10} {}", severity.as_str(), state.severity_count(severity));
    }
    if !state.aggregate.critical_units.is_empty() {
        println!(
            "Units with critical findings: {}",
            state.aggregate.critical_units.join(", ")
        );
    }
}
