//! JSON schemas for the two oracle response shapes.

use serde_json::{json, Value};

use lintgraph_core::result::Severity;
use lintgraph_oracle::ResponseShape;

/// The closed set of structured replies an oracle pass can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// The unit digest produced by the summary pass.
    Summary,
    /// The issue list produced by a finding pass.
    Findings,
}

impl ResponseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseKind::Summary => "summary",
            ResponseKind::Findings => "issues",
        }
    }

    pub fn schema(&self) -> Value {
        match self {
            ResponseKind::Summary => summary_schema(),
            ResponseKind::Findings => issues_schema(),
        }
    }

    /// The response-shape constraint sent with oracle requests.
    pub fn shape(&self) -> ResponseShape {
        ResponseShape {
            name: self.name().to_string(),
            schema: self.schema(),
        }
    }
}

pub fn summary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "purpose": {
                "type": "string",
                "description": "One sentence describing what the unit does"
            },
            "behavior": {
                "type": "string",
                "description": "Observable behavior, including error cases"
            },
            "invariants": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Invariants the unit relies on or maintains"
            },
            "security": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Security-relevant properties"
            }
        },
        "required": ["purpose", "behavior", "invariants", "security"],
        "additionalProperties": false
    })
}

pub fn issues_schema() -> Value {
    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "function": {
                            "type": "string",
                            "description": "Name of the member function the issue occurs in"
                        },
                        "line": {
                            "type": "integer",
                            "description": "Line within that function's body, 1 being its first line"
                        },
                        "code": {
                            "type": "string",
                            "description": "The offending line, quoted verbatim"
                        },
                        "severity": {
                            "type": "string",
                            "enum": severities,
                            "description": "Severity of the issue"
                        },
                        "message": {
                            "type": "string",
                            "description": "Description of the issue"
                        },
                        "suggestion": {
                            "type": "string",
                            "description": "Suggested fix"
                        }
                    },
                    "required": ["function", "severity", "message"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["issues"],
        "additionalProperties": false
    })
}
