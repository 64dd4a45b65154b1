//! OpenAI implementation of the AI trait.
//!
//! Every call goes through [`execute_with_retry`] with two transports: the
//! first attempt verifies certificates, later attempts accept any certificate
//! so the engine keeps working behind intercepting proxies.
//!
//! # Example
//!
//! ```rust,ignore
//! use climatech::ai::OpenAI;
//!
//! let ai = Arc::new(OpenAI::from_env()?.with_model("gpt-4o-mini"));
//! let analyzer = Analyzer::new(ai, EngineConfig::default(), corpus)?;
//! ```

use async_trait::async_trait;
use openai_client::{
    strict_schema, ChatRequest, Message, OpenAIClient, OpenAIError, ResponseFormat, Transport,
};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::retry::{execute_with_retry, RetryPolicy};
use crate::traits::ai::{CompletionRequest, Role, AI};

/// OpenAI-based AI implementation with retry and relaxed-TLS fallback.
#[derive(Clone)]
pub struct OpenAI {
    strict: OpenAIClient,
    relaxed: OpenAIClient,
    model: String,
    embedding_model: String,
    retry: RetryPolicy,
}

impl OpenAI {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_client(OpenAIClient::new(api_key))
    }

    /// Create from `OPENAI_API_KEY` (and optional `OPENAI_BASE_URL`).
    pub fn from_env() -> Result<Self> {
        let client = OpenAIClient::from_env().map_err(|e| EngineError::Config(e.to_string()))?;
        Self::from_client(client)
    }

    /// Build from environment credentials and the engine's model and retry settings.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::from_env()?
            .with_model(config.models.chat_model.clone())
            .with_embedding_model(config.models.embedding_model.clone())
            .with_retry(config.retry.clone()))
    }

    /// Wrap an existing client; a relaxed twin is derived from it.
    pub fn from_client(client: OpenAIClient) -> Result<Self> {
        let strict = client
            .with_transport(Transport::Strict)
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let relaxed = strict
            .clone()
            .with_transport(Transport::Relaxed)
            .map_err(|e| EngineError::Config(e.to_string()))?;

        Ok(Self {
            strict,
            relaxed,
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn transports(&self) -> [&OpenAIClient; 2] {
        [&self.strict, &self.relaxed]
    }

    fn chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| match m.role {
                Role::System => Message::system(&m.content),
                Role::User => Message::user(&m.content),
                Role::Assistant => Message::assistant(&m.content),
            })
            .collect();

        let mut chat = ChatRequest::new(&self.model).messages(messages);
        if let Some(temperature) = request.temperature {
            chat = chat.temperature(temperature);
        }
        if let Some(schema) = &request.schema {
            chat = chat.response_format(ResponseFormat::json_schema(
                schema.name.clone(),
                strict_schema(schema.schema.clone()),
            ));
        }
        chat
    }
}

#[async_trait]
impl AI for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let chat = self.chat_request(&request);
        let purpose = request.purpose;

        let response = execute_with_retry(
            &self.retry,
            &self.transports(),
            OpenAIError::is_retryable,
            |client, attempt| {
                let client: &OpenAIClient = *client;
                let chat = chat.clone();
                debug!(purpose = %purpose, attempt, transport = %client.transport(), "Chat completion");
                async move { client.chat_completion(chat).await }
            },
        )
        .await
        .map_err(|e| EngineError::AI(Box::new(e)))?;

        Ok(response.content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.embedding_model.as_str();
        execute_with_retry(
            &self.retry,
            &self.transports(),
            OpenAIError::is_retryable,
            |client, _| {
                let client: &OpenAIClient = *client;
                async move { client.create_embedding(text, model).await }
            },
        )
        .await
        .map_err(|e| EngineError::Embedding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;
    use crate::traits::ai::Purpose;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default().with_backoff(Backoff::Linear { step_ms: 1 })
    }

    #[tokio::test]
    async fn test_server_errors_use_every_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.url());
        let ai = OpenAI::from_client(client).unwrap().with_retry(fast_retry());

        let result = ai
            .complete(CompletionRequest::new(Purpose::Classify).user("Noticia"))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_completion_succeeds() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"SI, es climatech."}}]}"#)
            .create_async()
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.url());
        let ai = OpenAI::from_client(client).unwrap().with_retry(fast_retry());

        let reply = ai
            .complete(CompletionRequest::new(Purpose::Classify).user("Noticia"))
            .await
            .unwrap();
        assert_eq!(reply, "SI, es climatech.");
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_body("bad request")
            .expect(1)
            .create_async()
            .await;

        let client = OpenAIClient::new("sk-test").with_base_url(server.url());
        let ai = OpenAI::from_client(client).unwrap().with_retry(fast_retry());

        let err = ai
            .complete(CompletionRequest::new(Purpose::Judge).user("x"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.stage(), "generation");
    }

    #[test]
    fn test_schema_becomes_strict_response_format() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Payload {
            score: u8,
        }

        let ai = OpenAI::new("sk-test").unwrap();
        let chat = ai.chat_request(
            &CompletionRequest::new(Purpose::Judge)
                .system("json")
                .user("x")
                .json_schema::<Payload>("relation"),
        );
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["response_format"]["json_schema"]["name"], "relation");
        assert_eq!(
            json["response_format"]["json_schema"]["schema"]["additionalProperties"],
            false
        );
        assert_eq!(json["messages"][0]["role"], "system");
    }
}
