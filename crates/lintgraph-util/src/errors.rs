use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all lintgraph operations.
#[derive(Debug, Error, Diagnostic)]
pub enum LintError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The call graph handed to the condenser is malformed.
    #[error("Call graph error: {message}")]
    #[diagnostic(help("Check the extraction output for edges to undeclared functions"))]
    Graph { message: String },

    /// The oracle transport failed or returned an unusable reply.
    #[error("Oracle error: {message}")]
    Oracle { message: String },

    /// An oracle response could not be decoded even after normalization.
    #[error("Failed to parse oracle response: {message}")]
    #[diagnostic(help("The raw and normalized response text are attached to this error"))]
    Parse {
        message: String,
        raw: String,
        normalized: String,
    },

    /// Reading or writing the content-addressed cache failed.
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Invalid or malformed configuration (e.g. lintgraph.toml).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your lintgraph.toml for invalid values"))]
    Config { message: String },

    /// The run was cancelled between units.
    #[error("Run cancelled; progress was checkpointed")]
    #[diagnostic(help("Re-run with --resume to continue from the first incomplete unit"))]
    Cancelled,

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type LintResult<T> = miette::Result<T>;
