//! Command dispatch and handler modules.

mod analyze;
mod cache;
mod units;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            input,
            config,
            overrides,
            resume,
            prompts,
            state,
        } => {
            analyze::exec(
                analyze::AnalyzeOptions {
                    input,
                    config,
                    overrides,
                    resume,
                    prompts,
                    state,
                },
                cli.verbose,
            )
            .await
        }
        Command::Units { input } => units::exec(&input),
        Command::Cache { config, action } => cache::exec(config.as_deref(), action),
    }
}
