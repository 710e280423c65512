//! Deterministic oracle for tests and golden-output runs.
//!
//! Answers come from, in priority order: a failure rule matching the call,
//! the first route whose marker appears in the prompt, the queue of canned
//! responses, and finally `{"issues": []}`. Every request is recorded.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use lintgraph_util::errors::{LintError, LintResult};

use crate::{Oracle, Request, Response};

/// Response returned once routes and the queue are exhausted.
pub const DEFAULT_RESPONSE: &str = r#"{"issues": []}"#;

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<String>,
    routes: Vec<(String, String)>,
    fail_at: Option<usize>,
    fail_matching: Option<String>,
    requests: Vec<Request>,
}

#[derive(Debug, Default)]
pub struct MockOracle {
    state: Mutex<MockState>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock answering with `responses` in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for r in responses {
            mock.push(r);
        }
        mock
    }

    /// Queue a response.
    pub fn push(&self, response: impl Into<String>) {
        if let Ok(mut s) = self.lock() {
            s.queue.push_back(response.into());
        }
    }

    /// Answer with `response` whenever the prompt contains `marker`.
    pub fn route(&self, marker: impl Into<String>, response: impl Into<String>) {
        if let Ok(mut s) = self.lock() {
            s.routes.push((marker.into(), response.into()));
        }
    }

    /// Fail the `n`-th call (1-based).
    pub fn fail_at(&self, n: usize) {
        if let Ok(mut s) = self.lock() {
            s.fail_at = Some(n);
        }
    }

    /// Fail every call whose prompt contains `marker`.
    pub fn fail_matching(&self, marker: impl Into<String>) {
        if let Ok(mut s) = self.lock() {
            s.fail_matching = Some(marker.into());
        }
    }

    /// Stop failing.
    pub fn heal(&self) {
        if let Ok(mut s) = self.lock() {
            s.fail_at = None;
            s.fail_matching = None;
        }
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().map(|s| s.requests.clone()).unwrap_or_default()
    }

    /// The user prompt of every request received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.prompt().to_string())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.lock().map(|s| s.requests.len()).unwrap_or(0)
    }

    /// Forget recorded requests. Queue, routes and failure rules are kept.
    pub fn reset(&self) {
        if let Ok(mut s) = self.lock() {
            s.requests.clear();
        }
    }

    fn lock(&self) -> LintResult<MutexGuard<'_, MockState>> {
        self.state.lock().map_err(|_| {
            LintError::Oracle {
                message: "mock oracle state poisoned".into(),
            }
            .into()
        })
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, request: Request) -> LintResult<Response> {
        let mut s = self.lock()?;
        let prompt = request.prompt().to_string();
        s.requests.push(request);
        let call = s.requests.len();

        let fails = s.fail_at == Some(call)
            || s
                .fail_matching
                .as_deref()
                .is_some_and(|m| prompt.contains(m));
        if fails {
            return Err(LintError::Oracle {
                message: format!("mock oracle failure on call {call}"),
            }
            .into());
        }

        if let Some((_, response)) = s.routes.iter().find(|(m, _)| prompt.contains(m.as_str())) {
            return Ok(Response::text(response.clone()));
        }
        let content = s
            .queue
            .pop_front()
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string());
        Ok(Response::text(content))
    }
}
