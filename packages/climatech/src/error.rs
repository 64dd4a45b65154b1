//! Typed errors for the analysis engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only [`EngineError::Fetch`]
//! and [`EngineError::Extraction`] ever escape the public pipeline entry points;
//! every other variant is absorbed by the stage that produced it and turned
//! into a degraded-but-complete result.

use thiserror::Error;

/// Errors that can occur while analysing an article.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Network failure, certificate error or the origin blocked us, and the
    /// reader-proxy fallback failed as well
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The page was fetched but no usable text survived every fallback
    #[error("no extractable content at {url}: {reason}")]
    Extraction { url: String, reason: String },

    /// Translation failed (callers keep the original text)
    #[error("translation failed: {0}")]
    Translation(String),

    /// Classification failed (callers report `is_match = false`)
    #[error("classification failed: {0}")]
    Classification(String),

    /// Pairwise relation response was not the expected JSON
    #[error("malformed relation response: {raw}")]
    ScoringParse { raw: String },

    /// Generative backend unavailable or failed after all retries
    #[error("AI service error: {0}")]
    AI(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Embedding cache could not be read or written
    #[error("cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reference or feedback store unavailable
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Pipeline stage the error belongs to, for mapping to external statuses.
    pub fn stage(&self) -> &'static str {
        match self {
            EngineError::Fetch { .. } => "fetch",
            EngineError::Extraction { .. } => "extraction",
            EngineError::Translation(_) => "translation",
            EngineError::Classification(_) => "classification",
            EngineError::ScoringParse { .. } => "scoring",
            EngineError::AI(_) => "generation",
            EngineError::Embedding(_) | EngineError::Cache(_) => "embedding",
            EngineError::Json(_) => "serialization",
            EngineError::Store(_) => "store",
            EngineError::Config(_) => "config",
        }
    }

    /// Whether the error aborts the whole pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Fetch { .. } | EngineError::Extraction { .. })
    }

    pub(crate) fn ai(message: impl Into<String>) -> Self {
        EngineError::AI(message.into().into())
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_fetch_and_extraction_are_fatal() {
        let fetch = EngineError::Fetch {
            url: "https://example.com".into(),
            reason: "HTTP 403".into(),
        };
        assert!(fetch.is_fatal());
        assert_eq!(fetch.stage(), "fetch");
        assert!(fetch.to_string().contains("https://example.com"));

        assert!(!EngineError::Translation("timeout".into()).is_fatal());
        assert!(!EngineError::ScoringParse { raw: "nope".into() }.is_fatal());
        assert!(!EngineError::ai("down").is_fatal());
    }
}
