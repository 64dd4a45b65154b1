//! Pure OpenAI REST API client
//!
//! A small client for chat completions and embeddings with no domain logic.
//! Two transports are available: [`Transport::Strict`] verifies TLS
//! certificates as usual, [`Transport::Relaxed`] accepts any certificate so
//! the client keeps working behind certificate-intercepting proxies.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message, Transport};
//!
//! let client = OpenAIClient::from_env()?;
//! let relaxed = client.clone().with_transport(Transport::Relaxed)?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("gpt-4o-mini").message(Message::user("Hola")),
//! ).await?;
//!
//! let embedding = relaxed.create_embedding("texto", "text-embedding-3-small").await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::strict_schema;
pub use types::*;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// TLS behaviour of the underlying HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Normal certificate verification
    Strict,
    /// Accept invalid or self-signed certificates
    Relaxed,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Strict => write!(f, "strict"),
            Transport::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    transport: Transport,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a new client with the strict transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: Transport::Strict,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    ///
    /// `OPENAI_BASE_URL` overrides the API endpoint when present.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        let client = Self::new(api_key);
        Ok(match std::env::var("OPENAI_BASE_URL") {
            Ok(url) if !url.is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    /// Set a custom base URL (for Azure, proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Rebuild the HTTP client with a different transport.
    pub fn with_transport(mut self, transport: Transport) -> Result<Self> {
        self.http_client = build_http_client(transport, self.timeout)?;
        self.transport = transport;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the active transport.
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Chat completion.
    ///
    /// Empty completions are reported as [`OpenAIError::EmptyResponse`].
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(transport = %self.transport, error = %e, "OpenAI request failed");
                OpenAIError::Network(describe_reqwest_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(OpenAIError::EmptyResponse)?;

        debug!(
            model = %request.model,
            transport = %self.transport,
            duration_ms = start.elapsed().as_millis(),
            total_tokens = raw.usage.map(|u| u.total_tokens).unwrap_or_default(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }

    /// Create embedding for text.
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let request = types::EmbeddingRequest { model, input: text };

        let response = self
            .http_client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(transport = %self.transport, error = %e, "Embedding request failed");
                OpenAIError::Network(describe_reqwest_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI embedding error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let embed_response: types::EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(OpenAIError::EmptyResponse)
    }
}

fn build_http_client(transport: Transport, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(transport == Transport::Relaxed)
        .build()
        .map_err(|e| OpenAIError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Flatten the reqwest error chain so certificate problems stay visible.
fn describe_reqwest_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
