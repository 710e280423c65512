//! Per-unit oracle results: the semantic summary plus findings.

use serde::{Deserialize, Serialize};

use crate::function::{FunctionInfo, Position};

/// Severity of a finding. `Critical` is the top severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "CRITICAL")]
    Critical,
    #[serde(alias = "high", alias = "IMPORTANT")]
    Important,
    #[serde(alias = "medium", alias = "low", alias = "info", alias = "MINOR")]
    Minor,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Important, Severity::Minor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Minor => "minor",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic digest of a unit, consumed by callers' prompts and fingerprints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub purpose: String,
    pub behavior: String,
    #[serde(default)]
    pub invariants: Vec<String>,
    #[serde(default)]
    pub security: Vec<String>,
}

impl Summary {
    /// Canonical serialized form used in fingerprints and the cache.
    pub fn to_canonical_json(&self) -> String {
        // Plain struct of strings; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// How a finding was attributed to a member of its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribution {
    /// The oracle named a member that exists in the unit.
    Member,
    /// The member name was missing or unknown; the finding was attributed to
    /// the first member of the unit.
    Fallback,
}

/// One issue reported by a finding pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Node id of the member the finding is attributed to.
    pub function: String,
    pub attribution: Attribution,
    pub position: Position,
    pub severity: Severity,
    /// Name of the pass that produced the finding.
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Identifying metadata of a unit member, kept in results without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: String,
    pub package: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub signature: String,
    pub position: Position,
}

impl From<&FunctionInfo> for MemberInfo {
    fn from(f: &FunctionInfo) -> Self {
        Self {
            id: f.id.clone(),
            package: f.package.clone(),
            name: f.name.clone(),
            receiver: f.receiver.clone(),
            signature: f.signature.clone(),
            position: f.position.clone(),
        }
    }
}

/// Everything the oracle produced for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitResult {
    pub members: Vec<MemberInfo>,
    pub summary: Summary,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_accepts_aliases() {
        let s: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(s, Severity::Important);
        let s: Severity = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(s, Severity::Minor);
        let s: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(s, Severity::Critical);
    }

    #[test]
    fn severity_rejects_unknown() {
        assert!(serde_json::from_str::<Severity>("\"catastrophic\"").is_err());
    }

    #[test]
    fn canonical_summary_is_stable() {
        let s = Summary {
            purpose: "adds".into(),
            behavior: "returns a+b".into(),
            invariants: vec![],
            security: vec![],
        };
        assert_eq!(
            s.to_canonical_json(),
            r#"{"purpose":"adds","behavior":"returns a+b","invariants":[],"security":[]}"#
        );
    }
}
