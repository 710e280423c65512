//! Extracted program entities: internal functions and external callees.

use serde::{Deserialize, Serialize};

/// A source location as reported by the extraction tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One internally defined function or method, with its source payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Canonical node id (e.g. `pkg.Name` or `pkg.(Recv).Name`).
    pub id: String,
    pub package: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub signature: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub position: Position,
}

impl FunctionInfo {
    /// Source payload fed into the unit fingerprint: receiver, documentation,
    /// signature and body.
    ///
    /// Line endings are normalized to `\n` and trailing whitespace is dropped,
    /// so checkouts that only differ in line-ending style share cache entries.
    pub fn normalized_source(&self) -> String {
        let mut out = String::with_capacity(self.signature.len() + self.body.len() + 16);
        if let Some(receiver) = &self.receiver {
            out.push_str("receiver ");
            out.push_str(receiver.trim());
            out.push('\n');
        }
        if let Some(doc) = &self.doc {
            out.push_str("doc ");
            out.push_str(&normalize_text(doc));
            out.push('\n');
        }
        out.push_str(self.signature.trim_end());
        out.push('\n');
        out.push_str(&normalize_text(&self.body));
        out
    }
}

fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end().to_string()
}

/// Shallow metadata about a callee defined outside the analyzed code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFunc {
    pub package: String,
    pub name: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invariants: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pitfalls: Vec<String>,
}

impl ExternalFunc {
    /// Compact JSON record of the metadata, in field declaration order.
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
