use miette::Diagnostic;
use thiserror::Error;

use lintgraph_util::errors::LintError;

/// A malformed call graph. Always fatal, raised before any unit is built.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum GraphError {
    /// An edge points at a node that was never declared.
    #[error("edge {from} -> {to} references unknown node {to}")]
    UnknownNode { from: String, to: String },

    /// The same function id was declared twice.
    #[error("function {id} is declared more than once")]
    DuplicateNode { id: String },

    /// A graph node has no source payload.
    #[error("node {id} has no source payload")]
    MissingSource { id: String },
}

impl From<GraphError> for LintError {
    fn from(e: GraphError) -> Self {
        LintError::Graph {
            message: e.to_string(),
        }
    }
}
