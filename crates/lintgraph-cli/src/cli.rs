//! CLI argument definitions for lintgraph.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "lintgraph",
    version,
    about = "Dependency-ordered, cached oracle analysis of call graphs",
    long_about = "lintgraph condenses a call graph into analysis units, runs every unit \
                  through summary and finding passes of an LLM oracle in dependency order, \
                  caches results by content, and checkpoints so interrupted runs can resume."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze every unit of an extraction document
    Analyze {
        /// Extraction document (JSON) describing functions and call edges
        #[arg(short, long)]
        input: PathBuf,
        /// Configuration file [default: lintgraph.toml if present]
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override a configuration value (e.g. --set run.jobs=4)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        /// Continue from the run state left by an interrupted run
        #[arg(long)]
        resume: bool,
        /// Directory to resolve `builtin:<name>` prompts from
        #[arg(long)]
        prompts: Option<PathBuf>,
        /// Run-state file [default: output.state from the configuration]
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Print the analysis units of an extraction document in processing order
    Units {
        /// Extraction document (JSON) describing functions and call edges
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Manage the analysis cache
    Cache {
        /// Configuration file [default: lintgraph.toml if present]
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache location, entry count and size
    Stats,
    /// Remove every cache entry
    Clean,
}

pub fn parse() -> Cli {
    Cli::parse()
}
