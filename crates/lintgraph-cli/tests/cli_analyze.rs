use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const EXTRACTION: &str = r#"{
  "functions": [
    {"id": "A", "package": "p", "name": "A", "signature": "func A()", "body": "func A() {\n\tB()\n\tC()\n}", "position": {"file": "p.go", "line": 1}},
    {"id": "B", "package": "p", "name": "B", "signature": "func B()", "body": "func B() {\n\tA()\n}", "position": {"file": "p.go", "line": 6}},
    {"id": "C", "package": "p", "name": "C", "signature": "func C()", "body": "func C() {}", "position": {"file": "p.go", "line": 10}},
    {"id": "D", "package": "p", "name": "D", "signature": "func D()", "body": "func D() {\n\tA()\n}", "position": {"file": "p.go", "line": 12}}
  ],
  "graph": {"A": ["B", "C"], "B": ["A"], "D": ["A"]}
}"#;

const SUMMARY: &str = r#"{"purpose": "does things", "behavior": "calls helpers"}"#;
const ISSUES: &str = "```json\n{\"issues\": [{\"severity\": \"critical\", \"message\": \"boom\"}]}\n```";

#[allow(deprecated)]
fn lintgraph_cmd() -> Command {
    let mut cmd = Command::cargo_bin("lintgraph").unwrap();
    for var in [
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Serve OpenAI-style chat completions until the test process exits.
/// Returns the base URL; `hits` counts requests.
fn serve_chat(hits: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let request = read_request(&mut stream);
            hits.fetch_add(1, Ordering::SeqCst);

            let content = if request.contains(r#""name":"summary""#) {
                SUMMARY
            } else {
                ISSUES
            };
            let body = serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": content}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5}
            })
            .to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}/v1")
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(head_end) = text.find("\r\n\r\n") {
            let length = text[..head_end]
                .lines()
                .find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("content-length")
                        .then(|| v.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn write_project(dir: &Path, base_url: &str) {
    fs::write(dir.join("extraction.json"), EXTRACTION).unwrap();
    fs::write(
        dir.join("lintgraph.toml"),
        format!(
            r#"
[oracle]
base-url = "{base_url}"
model = "test-model"

[cache]
dir = 'cache'

[output]
state = 'out/state.json'

[[passes]]
name = "summary"
prompt = "builtin:summary"

[[passes]]
name = "security"
prompt = "builtin:security"
"#
        ),
    )
    .unwrap();
}

#[test]
fn test_analyze_runs_then_reuses_cache() {
    let tmp = TempDir::new().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = serve_chat(hits.clone());
    write_project(tmp.path(), &base_url);

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["analyze", "--input", "extraction.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Findings: 3"))
        .stdout(predicate::str::contains("critical   3"))
        .stdout(predicate::str::contains("Units with critical findings: C, A+B, D"))
        .stderr(predicate::str::contains("3 analyzed, 0 from cache"));

    // Two passes for each of three units.
    assert_eq!(hits.load(Ordering::SeqCst), 6);
    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("out/state.json")).unwrap())
            .unwrap();
    assert_eq!(state["units"].as_object().unwrap().len(), 3);
    assert_eq!(state["aggregate"]["total_issues"], 3);

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["analyze", "--input", "extraction.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 analyzed, 3 from cache"));
    assert_eq!(hits.load(Ordering::SeqCst), 6);

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries: 3"));

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["cache", "clean"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared analysis cache"));
    assert!(!tmp.path().join("cache").exists());
}

#[test]
fn test_analyze_resume_skips_completed_units() {
    let tmp = TempDir::new().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let base_url = serve_chat(hits.clone());
    write_project(tmp.path(), &base_url);

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["analyze", "--input", "extraction.json", "--set", "cache.enabled=false"])
        .assert()
        .success();
    assert_eq!(hits.load(Ordering::SeqCst), 6);

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args([
            "analyze",
            "--input",
            "extraction.json",
            "--set",
            "cache.enabled=false",
            "--resume",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 of 3 unit(s) already done"))
        .stderr(predicate::str::contains("0 analyzed, 0 from cache, 3 resumed"));
    assert_eq!(hits.load(Ordering::SeqCst), 6);
}

#[test]
fn test_analyze_unreachable_oracle_fails_and_keeps_state() {
    let tmp = TempDir::new().unwrap();
    // Bind then drop a listener so the port is very likely closed.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    write_project(tmp.path(), &format!("http://127.0.0.1:{port}/v1"));

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["analyze", "--input", "extraction.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("summary pass for C"));

    let state = fs::read_to_string(tmp.path().join("out/state.json")).unwrap();
    assert!(state.contains("\"units\": {}"));
}

#[test]
fn test_analyze_rejects_invalid_override() {
    let tmp = TempDir::new().unwrap();
    write_project(tmp.path(), "http://127.0.0.1:9/v1");

    lintgraph_cmd()
        .current_dir(tmp.path())
        .args(["analyze", "--input", "extraction.json", "--set", "run.jobs=0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run.jobs must be at least 1"));
}
