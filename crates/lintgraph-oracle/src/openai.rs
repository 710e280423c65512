//! OpenAI-compatible chat-completions client.
//!
//! Works against any server exposing `POST {base}/chat/completions` (OpenAI,
//! Ollama, llama.cpp, vLLM). A request is attempted exactly once; transport
//! failures, non-2xx statuses, API error objects and empty choice lists are
//! all reported as [`LintError::Oracle`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lintgraph_core::config::OracleConfig;
use lintgraph_util::errors::{LintError, LintResult};

use crate::{Oracle, Request, Response, Role, Usage};

/// Characters of an error body kept in the error message.
const ERROR_BODY_LIMIT: usize = 512;

pub struct OpenAiOracle {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiOracle {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> LintResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lintgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LintError::Oracle {
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &OracleConfig) -> LintResult<Self> {
        Self::new(
            &config.base_url,
            config.api_key(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "is_zero")]
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a serde_json::Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn build_body(request: &Request) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.is_empty() {
        messages.push(ChatMessage {
            role: Role::System,
            content: &request.system,
        });
    }
    messages.extend(request.messages.iter().map(|m| ChatMessage {
        role: m.role,
        content: &m.content,
    }));

    ChatRequest {
        model: &request.config.model,
        messages,
        max_tokens: request.config.max_tokens,
        temperature: request.config.temperature,
        response_format: request
            .config
            .response_shape
            .as_ref()
            .map(|shape| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &shape.name,
                    schema: &shape.schema,
                    strict: false,
                },
            }),
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, request: Request) -> LintResult<Response> {
        let url = self.endpoint();
        let body = build_body(&request);

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        tracing::debug!("POST {url} model={}", request.config.model);
        let resp = req.send().await.map_err(|e| LintError::Oracle {
            message: format!("Request to {url} failed: {e}"),
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| LintError::Oracle {
            message: format!("Failed to read response from {url}: {e}"),
        })?;

        if !status.is_success() {
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(LintError::Oracle {
                message: format!("HTTP {status} from {url}: {snippet}"),
            }
            .into());
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| LintError::Oracle {
            message: format!("Invalid response body from {url}: {e}"),
        })?;

        if let Some(err) = parsed.error {
            return Err(LintError::Oracle {
                message: format!("API error: {}", err.message),
            }
            .into());
        }

        let choice = parsed.choices.into_iter().next().ok_or_else(|| LintError::Oracle {
            message: format!("No choices in response from {url}"),
        })?;

        let usage = parsed
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Response {
            content: choice.message.content.unwrap_or_default(),
            usage,
        })
    }
}
