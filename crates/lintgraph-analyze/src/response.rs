//! Strict decoding of oracle responses.
//!
//! Raw text always goes through [`normalize`] first. Anything that still does
//! not decode into the expected shape is a [`ParseError`] carrying both the
//! raw and the normalized text; nothing is guessed or silently dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lintgraph_core::result::{Severity, Summary};
use lintgraph_util::errors::LintError;

use crate::normalize::normalize;
use crate::schema::ResponseKind;

/// Reply of the summary pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryResponse {
    pub purpose: String,
    pub behavior: String,
    #[serde(default)]
    pub invariants: Vec<String>,
    #[serde(default)]
    pub security: Vec<String>,
}

impl From<SummaryResponse> for Summary {
    fn from(r: SummaryResponse) -> Self {
        Summary {
            purpose: r.purpose,
            behavior: r.behavior,
            invariants: r.invariants,
            security: r.security,
        }
    }
}

/// One issue reported by a finding pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueResponse {
    /// Member name (or node id) the issue occurs in.
    #[serde(default)]
    pub function: Option<String>,
    /// 1-based line within the member body.
    #[serde(default)]
    pub line: Option<u32>,
    /// The offending code, quoted verbatim.
    #[serde(default)]
    pub code: Option<String>,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<IssueResponse>,
}

/// Oracle text that could not be decoded after normalization.
#[derive(Debug, Error)]
#[error("invalid {} response: {source}", .kind.name())]
pub struct ParseError {
    pub kind: ResponseKind,
    /// The text exactly as the oracle returned it.
    pub raw: String,
    /// The text after normalization, as handed to the decoder.
    pub normalized: String,
    #[source]
    pub source: serde_json::Error,
}

impl From<ParseError> for LintError {
    fn from(e: ParseError) -> Self {
        LintError::Parse {
            message: e.to_string(),
            raw: e.raw,
            normalized: e.normalized,
        }
    }
}

/// Decode a summary-pass reply.
pub fn decode_summary(raw: &str) -> Result<SummaryResponse, ParseError> {
    let normalized = normalize(raw);
    serde_json::from_str(&normalized)
        .map_err(|source| parse_error(ResponseKind::Summary, raw, normalized, source))
}

/// Decode a finding-pass reply. An empty reply or `{}` means no findings.
pub fn decode_findings(raw: &str) -> Result<Vec<IssueResponse>, ParseError> {
    let normalized = normalize(raw);
    if normalized.is_empty() || normalized == "{}" {
        return Ok(Vec::new());
    }
    serde_json::from_str::<IssuesResponse>(&normalized)
        .map(|r| r.issues)
        .map_err(|source| parse_error(ResponseKind::Findings, raw, normalized, source))
}

fn parse_error(
    kind: ResponseKind,
    raw: &str,
    normalized: String,
    source: serde_json::Error,
) -> ParseError {
    ParseError {
        kind,
        raw: raw.to_string(),
        normalized,
        source,
    }
}
