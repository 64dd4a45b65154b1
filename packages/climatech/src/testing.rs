//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the engine without
//! making real AI or network calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{EngineError, Result};
use crate::traits::ai::{CompletionRequest, Purpose, AI};

/// A mock AI implementation for testing.
///
/// Completions are resolved in this order:
/// 1. failure injection for the request's purpose
/// 2. the first rule whose needle occurs in the user message
/// 3. the FIFO queue of scripted replies
/// 4. the per-purpose default
/// 5. a built-in reply (translation echoes the input, classification and
///    judgment answer "NO", explanations fail)
///
/// Embeddings are predefined or derived deterministically from a SHA-256 of
/// the text.
#[derive(Default)]
pub struct MockAI {
    rules: Arc<RwLock<Vec<Rule>>>,
    queue: Arc<RwLock<VecDeque<String>>>,
    defaults: Arc<RwLock<HashMap<Purpose, String>>>,
    failing: Arc<RwLock<HashSet<Purpose>>>,
    fail_embeddings: bool,

    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Default embedding dimension
    embedding_dim: usize,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

struct Rule {
    purpose: Option<Purpose>,
    needle: String,
    reply: String,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAICall {
    Complete { purpose: Purpose, prompt: String },
    Embed { text_len: usize },
}

impl MockAI {
    /// Create a new mock AI with default behavior.
    pub fn new() -> Self {
        Self {
            embedding_dim: 64,
            ..Default::default()
        }
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Reply with `reply` to any `purpose` request whose user text contains `needle`.
    pub fn with_rule(
        self,
        purpose: Purpose,
        needle: impl Into<String>,
        reply: impl Into<String>,
    ) -> Self {
        self.rules.write().unwrap().push(Rule {
            purpose: Some(purpose),
            needle: needle.into(),
            reply: reply.into(),
        });
        self
    }

    /// Queue a reply consumed by the next unmatched completion.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.queue.write().unwrap().push_back(reply.into());
        self
    }

    /// Reply used for `purpose` when no rule or queued reply applies.
    pub fn with_default(self, purpose: Purpose, reply: impl Into<String>) -> Self {
        self.defaults.write().unwrap().insert(purpose, reply.into());
        self
    }

    /// Make every completion for `purpose` fail.
    pub fn with_failure(self, purpose: Purpose) -> Self {
        self.failing.write().unwrap().insert(purpose);
        self
    }

    /// Make every embedding call fail.
    pub fn with_failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of completions issued for `purpose`.
    pub fn completion_count(&self, purpose: Purpose) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Complete { purpose: p, .. } if *p == purpose))
            .count()
    }

    /// Number of embedding calls issued.
    pub fn embed_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockAICall::Embed { .. }))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Generate a deterministic embedding based on text.
    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let hash = Sha256::digest(text.as_bytes());

        (0..self.embedding_dim)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                // Normalize to [-1, 1] range
                (byte / 127.5) - 1.0
            })
            .collect()
    }

    fn builtin_reply(purpose: Purpose, request: &CompletionRequest) -> Result<String> {
        match purpose {
            Purpose::Translate => {
                let text = request.user_text();
                Ok(text
                    .split_once("\n\n")
                    .map(|(_, body)| body.to_string())
                    .unwrap_or(text))
            }
            Purpose::Classify => Ok("NO. La noticia no trata temas ambientales.".to_string()),
            Purpose::Judge => Ok(
                r#"{"relacionado":"NO","razon":"No comparten entidades concretas.","score":0}"#
                    .to_string(),
            ),
            Purpose::Explain => Err(EngineError::ai("no scripted explanation")),
        }
    }
}

#[async_trait]
impl AI for MockAI {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let purpose = request.purpose;
        let prompt = request.user_text();
        self.calls.write().unwrap().push(MockAICall::Complete {
            purpose,
            prompt: prompt.clone(),
        });

        if self.failing.read().unwrap().contains(&purpose) {
            return Err(EngineError::ai(format!("mock {} failure", purpose)));
        }

        let ruled = self
            .rules
            .read()
            .unwrap()
            .iter()
            .find(|r| r.purpose.map_or(true, |p| p == purpose) && prompt.contains(&r.needle))
            .map(|r| r.reply.clone());
        if let Some(reply) = ruled {
            return Ok(reply);
        }

        if let Some(reply) = self.queue.write().unwrap().pop_front() {
            return Ok(reply);
        }

        if let Some(reply) = self.defaults.read().unwrap().get(&purpose) {
            return Ok(reply.clone());
        }

        Self::builtin_reply(purpose, &request)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockAICall::Embed {
            text_len: text.len(),
        });

        if self.fail_embeddings {
            return Err(EngineError::Embedding("mock embedding failure".into()));
        }

        if let Some(embedding) = self.embeddings.read().unwrap().get(text) {
            return Ok(embedding.clone());
        }

        Ok(self.generate_deterministic_embedding(text))
    }
}
