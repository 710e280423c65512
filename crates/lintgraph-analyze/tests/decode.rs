use lintgraph_analyze::response::{decode_findings, decode_summary};
use lintgraph_core::result::Severity;

#[test]
fn test_fenced_summary_with_raw_newline() {
    let raw = "```json\n{\"purpose\": \"line1\nline2\", \"behavior\": \"b\"}\n```";
    let s = decode_summary(raw).unwrap();
    assert_eq!(s.purpose, "line1\nline2");
    assert_eq!(s.behavior, "b");
    assert!(s.invariants.is_empty());
}

#[test]
fn test_prose_around_the_fence_is_ignored() {
    let raw = "Here is my analysis:\n\n```\n{\"issues\": [{\"severity\": \"high\", \"message\": \"tab\there\"}]}\n```\nLet me know if you need more.";
    let issues = decode_findings(raw).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Important);
    assert_eq!(issues[0].message, "tab\there");
    assert!(issues[0].function.is_none());
}

#[test]
fn test_wrong_shape_reports_both_texts() {
    let raw = "  ```json\n[1, 2]\n```  ";
    let err = decode_summary(raw).unwrap_err();
    assert_eq!(err.raw, raw);
    assert_eq!(err.normalized, "[1, 2]");
    assert!(err.to_string().starts_with("invalid summary response"));
}

#[test]
fn test_missing_severity_is_rejected() {
    let raw = r#"{"issues": [{"message": "no severity"}]}"#;
    assert!(decode_findings(raw).is_err());
}
