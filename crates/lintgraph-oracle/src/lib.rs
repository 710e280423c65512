//! The oracle collaborator.
//!
//! An oracle turns a rendered prompt plus model parameters into free-form
//! text. lintgraph treats it as a black box behind the single-method
//! [`Oracle`] trait: no retries, no backoff, no interpretation of the text.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lintgraph_core::config::OracleConfig;
use lintgraph_util::errors::{LintError, LintResult};

pub use mock::MockOracle;
pub use openai::OpenAiOracle;

/// A text-completion backend.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, request: Request) -> LintResult<Response>;
}

/// Input for one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Optional system prompt, sent ahead of `messages`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    pub messages: Vec<Message>,
    pub config: ModelConfig,
}

impl Request {
    /// A request carrying a single user message.
    pub fn user(prompt: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            system: String::new(),
            messages: vec![Message::user(prompt)],
            config,
        }
    }

    /// Content of the first user message, or an empty string.
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Model parameters for one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Structured-output constraint, when the backend supports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_shape: Option<ResponseShape>,
}

/// A named JSON schema the response must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseShape {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Output of one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub content: String,
    #[serde(default)]
    pub usage: Usage,
}

impl Response {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: Usage::default(),
        }
    }
}

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Build the oracle selected by `[oracle] provider`.
pub fn from_config(config: &OracleConfig) -> LintResult<Box<dyn Oracle>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiOracle::from_config(config)?)),
        other => Err(LintError::Config {
            message: format!("Unknown oracle provider '{other}' (available: openai)"),
        }
        .into()),
    }
}
