//! AI trait for generative and embedding operations.
//!
//! The engine only needs two primitives: a chat-style completion (role-tagged
//! messages in, one text out) and a text embedding. Prompting and response
//! parsing live with the component that issues the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What a completion is for. Used for logging and by test doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Translate,
    Classify,
    Judge,
    Explain,
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Purpose::Translate => "translate",
            Purpose::Classify => "classify",
            Purpose::Judge => "judge",
            Purpose::Explain => "explain",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// Named JSON schema the completion must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub purpose: Purpose,
    pub messages: Vec<PromptMessage>,
    pub temperature: Option<f32>,

    /// Ask for JSON matching this schema instead of free text
    pub schema: Option<OutputSchema>,
}

impl CompletionRequest {
    pub fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            messages: Vec::new(),
            temperature: None,
            schema: None,
        }
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Role::System, content)
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Role::User, content)
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Role::Assistant, content)
    }

    pub fn message(mut self, role: Role, content: impl Into<String>) -> Self {
        self.messages.push(PromptMessage {
            role,
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request JSON output matching the schema of `T`.
    pub fn json_schema<T: schemars::JsonSchema>(mut self, name: impl Into<String>) -> Self {
        let schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
        self.schema = Some(OutputSchema {
            name: name.into(),
            schema,
        });
        self
    }

    /// Concatenated user content, handy for matching in tests.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// AI trait for LLM operations.
///
/// Implementations handle transport, retries and provider specifics. An
/// empty completion must be reported as an error, never as `Ok("")`.
#[async_trait]
pub trait AI: Send + Sync {
    /// Run a chat completion and return the trimmed text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Generate embedding for text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
impl<T: AI + ?Sized> AI for std::sync::Arc<T> {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text).await
    }
}
