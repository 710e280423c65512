use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use lintgraph_util::errors::LintError;

/// An I/O failure on the cache store.
#[derive(Debug, Error, Diagnostic)]
pub enum CacheError {
    #[error("cache I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache store is unavailable: {0}")]
    Unavailable(String),
}

impl From<CacheError> for LintError {
    fn from(e: CacheError) -> Self {
        LintError::Cache {
            message: e.to_string(),
        }
    }
}
