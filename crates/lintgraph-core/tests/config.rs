use lintgraph_core::config::{Config, SUMMARY_PASS};
use tempfile::TempDir;

#[test]
fn test_default_config_is_valid() {
    let config = Config::default();
    config.validate().unwrap();
    assert_eq!(config.run.jobs, 1);
    assert_eq!(config.run.checkpoint_every, 10);
    assert!(config.cache.enabled);
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.passes[0].name, SUMMARY_PASS);
    assert_eq!(config.finding_passes().count(), 6);
}

#[test]
fn test_kebab_case_keys() {
    let config = Config::from_toml(
        r#"
[oracle]
base-url = "https://api.example.com/v1"
max-tokens = 512
api-key-env = "EXAMPLE_KEY"

[run]
checkpoint-every = 3
jobs = 4
"#,
    )
    .unwrap();
    assert_eq!(config.oracle.base_url, "https://api.example.com/v1");
    assert_eq!(config.oracle.max_tokens, 512);
    assert_eq!(config.oracle.api_key_env.as_deref(), Some("EXAMPLE_KEY"));
    assert_eq!(config.run.checkpoint_every, 3);
    assert_eq!(config.run.jobs, 4);
}

#[test]
fn test_pass_override_replaces_only_given_params() {
    let config = Config::from_toml(
        r#"
[oracle]
model = "small"
max-tokens = 100
temperature = 0.2

[[passes]]
name = "summary"
prompt = "builtin:summary"

[[passes]]
name = "security"
prompt = "builtin:security"
[passes.oracle]
model = "large"
"#,
    )
    .unwrap();
    let summary = config.summary_pass().unwrap();
    assert_eq!(config.params_for(summary).model, "small");

    let security = config.finding_passes().next().unwrap();
    let params = config.params_for(security);
    assert_eq!(params.model, "large");
    assert_eq!(params.max_tokens, 100);
    assert!((params.temperature - 0.2).abs() < f32::EPSILON);
}

#[test]
fn test_disabled_passes_are_skipped() {
    let config = Config::from_toml(
        r#"
[[passes]]
name = "summary"
prompt = "builtin:summary"

[[passes]]
name = "security"
prompt = "builtin:security"
enabled = false

[[passes]]
name = "errors"
prompt = "builtin:errors"
"#,
    )
    .unwrap();
    let names: Vec<&str> = config.finding_passes().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["errors"]);
}

#[test]
fn test_missing_summary_pass_is_rejected() {
    let err = Config::from_toml(
        r#"
[[passes]]
name = "security"
prompt = "builtin:security"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("summary"), "got: {err}");
}

#[test]
fn test_duplicate_pass_is_rejected() {
    let err = Config::from_toml(
        r#"
[[passes]]
name = "summary"
prompt = "builtin:summary"

[[passes]]
name = "summary"
prompt = "builtin:summary"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Duplicate"), "got: {err}");
}

#[test]
fn test_zero_jobs_is_rejected() {
    assert!(Config::from_toml("[run]\njobs = 0").is_err());
    assert!(Config::from_toml("[run]\ncheckpoint-every = 0").is_err());
}

#[test]
fn test_load_applies_overrides_over_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lintgraph.toml");
    std::fs::write(&path, "[oracle]\nmodel = \"from-file\"\nmax-tokens = 7\n").unwrap();

    let config = Config::load(
        Some(&path),
        &["oracle.model=from-flag".to_string(), "run.jobs=2".to_string()],
    )
    .unwrap();
    assert_eq!(config.oracle.model, "from-flag");
    assert_eq!(config.oracle.max_tokens, 7);
    assert_eq!(config.run.jobs, 2);
}

#[test]
fn test_load_explicit_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    assert!(Config::load(Some(&tmp.path().join("nope.toml")), &[]).is_err());
}

#[test]
fn test_load_invalid_override_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("lintgraph.toml");
    std::fs::write(&path, "").unwrap();
    assert!(Config::load(Some(&path), &["no-equals-sign".to_string()]).is_err());
    assert!(Config::load(Some(&path), &["run.jobs=zero".to_string()]).is_err());
}
