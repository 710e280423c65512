//! The extraction document: read-only input produced by language tooling.
//!
//! lintgraph never parses source code itself. An extractor emits one JSON
//! document listing the defined functions, the raw call graph (which may
//! name callees that are not defined internally), and metadata for those
//! external callees.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lintgraph_util::errors::LintError;

use crate::function::{ExternalFunc, FunctionInfo};

/// Raw output of the extraction collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    /// Caller id -> callee ids. Callees may be external or unknown.
    #[serde(default)]
    pub graph: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub externals: BTreeMap<String, ExternalFunc>,
}

impl Extraction {
    /// Parse an extraction document from a JSON string.
    pub fn from_json(json: &str) -> miette::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            LintError::Generic {
                message: format!("Failed to parse extraction document: {e}"),
            }
            .into()
        })
    }

    /// Read and parse an extraction document from disk.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LintError::Generic {
            message: format!("Failed to read extraction document {}: {e}", path.display()),
        })?;
        Self::from_json(&content)
    }
}
