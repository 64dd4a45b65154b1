//! Generative backend selection.

use async_trait::async_trait;
use climatech::ai::OpenAI;
use climatech::{CompletionRequest, EngineConfig, EngineError, AI};

/// The AI behind the analyzer: OpenAI, or nothing at all in offline mode.
pub enum Backend {
    OpenAI(OpenAI),
    Offline,
}

impl Backend {
    pub fn connect(config: &EngineConfig, offline: bool) -> climatech::Result<Self> {
        if offline {
            return Ok(Backend::Offline);
        }
        Ok(Backend::OpenAI(OpenAI::from_config(config)?))
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Backend::Offline)
    }
}

#[async_trait]
impl AI for Backend {
    async fn complete(&self, request: CompletionRequest) -> climatech::Result<String> {
        match self {
            Backend::OpenAI(ai) => ai.complete(request).await,
            Backend::Offline => Err(EngineError::Config(format!(
                "no generative backend for {} in offline mode",
                request.purpose
            ))),
        }
    }

    async fn embed(&self, text: &str) -> climatech::Result<Vec<f32>> {
        match self {
            Backend::OpenAI(ai) => ai.embed(text).await,
            Backend::Offline => Err(EngineError::Config(
                "no embedding backend in offline mode".to_string(),
            )),
        }
    }
}
