#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lintgraph_analyze::Analyzer;
use lintgraph_cache::ContentCache;
use lintgraph_core::config::Config;
use lintgraph_core::extraction::Extraction;
use lintgraph_core::function::{FunctionInfo, Position};
use lintgraph_core::unit::AnalysisUnit;
use lintgraph_oracle::{MockOracle, Oracle};
use tempfile::TempDir;

pub const SUMMARY_PROMPT: &str = "SUMMARY {{unit_id}}\n{{callees}}\n{{unit}}";
pub const CHECK_PROMPT: &str = "CHECK {{unit_id}}\n{{summary}}{{unit}}";

pub fn function(id: &str, body: &str) -> FunctionInfo {
    FunctionInfo {
        id: id.to_string(),
        package: "pkg".to_string(),
        name: id.to_string(),
        receiver: None,
        signature: format!("func {id}() int"),
        body: body.to_string(),
        doc: None,
        position: Position {
            file: "pkg/pkg.go".to_string(),
            line: 100,
            column: 1,
        },
    }
}

pub fn default_body(id: &str) -> String {
    format!("func {id}() int {{\n\tx := compute()\n\treturn x\n}}")
}

/// Plan units for functions with the given bodies and edges.
pub fn plan(functions: &[(&str, &str)], edges: &[(&str, &str)]) -> Vec<AnalysisUnit> {
    let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (from, to) in edges {
        graph.entry(from.to_string()).or_default().push(to.to_string());
    }
    let extraction = Extraction {
        functions: functions.iter().map(|(id, body)| function(id, body)).collect(),
        graph,
        externals: BTreeMap::new(),
    };
    lintgraph_graph::plan_units(&extraction).unwrap()
}

/// `n` units `f01..fNN`, each calling the previous one.
pub fn chain(n: usize) -> Vec<AnalysisUnit> {
    let ids: Vec<String> = (1..=n).map(|i| format!("f{i:02}")).collect();
    let bodies: Vec<String> = ids.iter().map(|id| default_body(id)).collect();
    let functions: Vec<(&str, &str)> = ids
        .iter()
        .zip(&bodies)
        .map(|(id, body)| (id.as_str(), body.as_str()))
        .collect();
    let edges: Vec<(&str, &str)> = ids
        .windows(2)
        .map(|w| (w[1].as_str(), w[0].as_str()))
        .collect();
    plan(&functions, &edges)
}

pub fn summary_json(purpose: &str) -> String {
    format!(r#"{{"purpose":"{purpose}","behavior":"computes x","invariants":["x is set"],"security":[]}}"#)
}

/// Deterministic issues for the unit at position `i`.
pub fn issues_json(id: &str, i: usize) -> String {
    match i % 3 {
        0 => format!(
            r#"{{"issues":[{{"function":"{id}","code":"return x","severity":"critical","message":"unchecked result"}}]}}"#
        ),
        1 => format!(
            r#"```json
{{"issues":[
  {{"function":"{id}","code":"x := compute()","severity":"important","message":"ignored
error"}},
  {{"function":"nobody","severity":"minor","message":"style","suggestion":"rename"}}
]}}
```"#
        ),
        _ => "{}".to_string(),
    }
}

/// A mock oracle answering both passes for every unit in `units`.
pub fn scripted_oracle(units: &[AnalysisUnit]) -> Arc<MockOracle> {
    scripted_oracle_with(units, &[])
}

/// Like [`scripted_oracle`], with `overrides` routed ahead of the script.
pub fn scripted_oracle_with(units: &[AnalysisUnit], overrides: &[(&str, &str)]) -> Arc<MockOracle> {
    let mock = MockOracle::new();
    for (marker, response) in overrides {
        mock.route(*marker, *response);
    }
    for (i, unit) in units.iter().enumerate() {
        mock.route(
            format!("SUMMARY {}\n", unit.id),
            summary_json(&format!("purpose of {}", unit.id)),
        );
        mock.route(format!("CHECK {}\n", unit.id), issues_json(&unit.id, i));
    }
    Arc::new(mock)
}

/// Prompt directory holding `summary.txt` and `check.txt`.
pub fn prompts_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("summary.txt"), SUMMARY_PROMPT).unwrap();
    std::fs::write(dir.path().join("check.txt"), CHECK_PROMPT).unwrap();
    dir
}

pub fn config(checkpoint_every: usize, jobs: usize) -> Config {
    Config::from_toml(&format!(
        r#"
[run]
checkpoint-every = {checkpoint_every}
jobs = {jobs}

[[passes]]
name = "summary"
prompt = "builtin:summary"

[[passes]]
name = "check"
prompt = "builtin:check"
"#
    ))
    .unwrap()
}

pub fn build_analyzer(
    config: &Config,
    prompts: &Path,
    oracle: Arc<MockOracle>,
    cache: Option<Arc<dyn ContentCache>>,
) -> Arc<Analyzer> {
    let oracle: Arc<dyn Oracle> = oracle;
    Arc::new(Analyzer::new(config, oracle, cache, BTreeMap::new(), Some(prompts)).unwrap())
}

/// Prompts sent to the oracle that start with `prefix` (e.g. `SUMMARY`).
pub fn prompted_units(oracle: &MockOracle, prefix: &str) -> Vec<String> {
    oracle
        .prompts()
        .iter()
        .filter_map(|p| p.lines().next())
        .filter_map(|first| first.strip_prefix(prefix))
        .map(|id| id.trim().to_string())
        .collect()
}
