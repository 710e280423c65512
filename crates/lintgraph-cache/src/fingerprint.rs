//! Unit fingerprinting for cache lookups.
//!
//! A fingerprint is a SHA-256 over, in order:
//! 1. a configuration tag (passes, prompts, model parameters)
//! 2. each member's normalized source (receiver, doc, signature, body), in
//!    member order
//! 3. the metadata record of each known external callee, in
//!    `external_callees` order
//! 4. the canonical summary JSON of each dependency, in `dependencies` order
//!
//! Because dependency summaries are hashed, any change upstream changes the
//! fingerprint of every unit downstream of it.

use lintgraph_core::function::ExternalFunc;
use lintgraph_core::result::Summary;
use lintgraph_core::unit::AnalysisUnit;
use lintgraph_util::hash::sha256_parts;

/// A computed unit fingerprint: 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    hash: String,
}

impl Fingerprint {
    /// Parse a fingerprint from its hex form. Returns `None` for anything that
    /// is not a 64-character lowercase hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == 64
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self {
            hash: hex.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hash)
    }
}

/// Compute the fingerprint for `unit`.
///
/// `externals` holds the metadata known for the unit's external callees.
/// `dependency_summaries` must hold one `(unit id, summary)` pair per entry of
/// `unit.dependencies`, in the same order.
pub fn compute(
    config_tag: &str,
    unit: &AnalysisUnit,
    externals: &[(&str, &ExternalFunc)],
    dependency_summaries: &[(&str, &Summary)],
) -> Fingerprint {
    debug_assert_eq!(
        dependency_summaries.len(),
        unit.dependencies.len(),
        "missing dependency summaries for {}",
        unit.id
    );

    let mut parts: Vec<String> =
        Vec::with_capacity(1 + unit.members.len() + externals.len() + dependency_summaries.len());
    parts.push(format!("config:{config_tag}\n"));
    for member in &unit.members {
        parts.push(format!("member:{}\n{}\n", member.id, member.normalized_source()));
    }
    for (id, ext) in externals {
        parts.push(format!("ext:{id}\n{}\n", ext.to_canonical_json()));
    }
    for (dep, summary) in dependency_summaries {
        parts.push(format!("dep:{dep}\n{}\n", summary.to_canonical_json()));
    }

    Fingerprint {
        hash: sha256_parts(&parts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintgraph_core::function::{FunctionInfo, Position};

    fn unit(body: &str, deps: &[&str]) -> AnalysisUnit {
        AnalysisUnit {
            id: "pkg.F".into(),
            members: vec![FunctionInfo {
                id: "pkg.F".into(),
                package: "pkg".into(),
                name: "F".into(),
                receiver: None,
                signature: "func F()".into(),
                body: body.into(),
                doc: None,
                position: Position::default(),
            }],
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
            external_callees: vec![],
        }
    }

    fn summary(purpose: &str) -> Summary {
        Summary {
            purpose: purpose.into(),
            behavior: "b".into(),
            invariants: vec![],
            security: vec![],
        }
    }

    #[test]
    fn fingerprint_is_hex() {
        let fp = compute("t", &unit("{}", &[]), &[], &[]);
        assert_eq!(fp.as_str().len(), 64);
        assert_eq!(Fingerprint::from_hex(fp.as_str()), Some(fp));
    }

    #[test]
    fn line_endings_do_not_matter() {
        let a = compute("t", &unit("{\n\treturn\n}", &[]), &[], &[]);
        let b = compute("t", &unit("{\r\n\treturn\r\n}\r\n", &[]), &[], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn dependency_summary_changes_fingerprint() {
        let u = unit("{}", &["dep"]);
        let s1 = summary("one");
        let s2 = summary("two");
        assert_ne!(
            compute("t", &u, &[], &[("dep", &s1)]),
            compute("t", &u, &[], &[("dep", &s2)])
        );
    }

    #[test]
    fn config_tag_changes_fingerprint() {
        let u = unit("{}", &[]);
        assert_ne!(compute("a", &u, &[], &[]), compute("b", &u, &[], &[]));
    }

    #[test]
    fn member_doc_changes_fingerprint() {
        let mut safe = unit("{}", &[]);
        safe.members[0].doc = Some("Safe for concurrent use.".into());
        let mut locked = unit("{}", &[]);
        locked.members[0].doc = Some("Caller must hold the lock.".into());
        assert_ne!(compute("t", &safe, &[], &[]), compute("t", &locked, &[], &[]));
    }

    #[test]
    fn member_receiver_changes_fingerprint() {
        let mut value = unit("{}", &[]);
        value.members[0].receiver = Some("T".into());
        let mut pointer = unit("{}", &[]);
        pointer.members[0].receiver = Some("*T".into());
        assert_ne!(compute("t", &value, &[], &[]), compute("t", &pointer, &[], &[]));
    }

    #[test]
    fn external_metadata_changes_fingerprint() {
        let mut u = unit("{}", &[]);
        u.external_callees = vec!["io.Copy".into()];
        let plain = ExternalFunc {
            package: "io".into(),
            name: "Copy".into(),
            signature: "func Copy(dst Writer, src Reader) (int64, error)".into(),
            ..ExternalFunc::default()
        };
        let mut warned = plain.clone();
        warned.pitfalls = vec!["unbounded read".into()];

        let base = compute("t", &u, &[("io.Copy", &plain)], &[]);
        assert_ne!(base, compute("t", &u, &[("io.Copy", &warned)], &[]));
        assert_ne!(base, compute("t", &u, &[], &[]));
        assert_eq!(base, compute("t", &u, &[("io.Copy", &plain)], &[]));
    }

    #[test]
    fn from_hex_rejects_paths() {
        assert!(Fingerprint::from_hex("../../etc/passwd").is_none());
        assert!(Fingerprint::from_hex(&"A".repeat(64)).is_none());
    }
}
