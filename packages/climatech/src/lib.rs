//! Content analysis and relevance matching for climate-technology news.
//!
//! Takes a news URL (or raw text), extracts the article, translates English
//! into Spanish, builds an extractive summary, decides whether the article is
//! climatech and, if so, finds the curated newsletters it is concretely
//! related to.
//!
//! # Usage
//!
//! ```rust,ignore
//! use climatech::{Analyzer, EngineConfig, MemoryReferenceStore};
//! use climatech::ai::OpenAI;
//!
//! let config = EngineConfig::from_env()?;
//! let ai = Arc::new(OpenAI::from_config(&config)?);
//! let corpus = Arc::new(MemoryReferenceStore::from_json_file("newsletters.json")?);
//!
//! let analyzer = Analyzer::new(ai, config, corpus)?;
//! let analysis = analyzer.analyze_article("https://diario.example/nota").await?;
//! analyzer.flush().await?;
//! ```
//!
//! # Modules
//!
//! - [`extract`] - Page fetching with reader-proxy fallback and HTML extraction
//! - [`language`] - Language detection and chunked translation
//! - [`summarize`] - Deterministic extractive summarizer
//! - [`classify`] - Climatech classifier and verdict rule table
//! - [`matching`] - Lexical pre-filter, negative penalty and pairwise judgment
//! - [`cache`] - Persistent embedding cache
//! - [`retry`] - Retry policy over ordered transports
//! - [`stores`] - Reference and feedback stores
//! - [`testing`] - Mock implementations for testing

pub mod analyzer;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod language;
pub mod matching;
pub mod prompts;
pub mod retry;
pub mod stores;
pub mod summarize;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

pub use analyzer::{normalize_link, Analyzer, ClassificationMode};
pub use cache::{cosine_similarity, EmbeddingCache};
pub use classify::{keyword_verdict, parse_verdict, ClimatechClassifier, Verdict};
pub use config::{
    CacheConfig, EngineConfig, ExtractorConfig, LanguageConfig, MatcherConfig, ModelConfig,
    PenaltyTier, SummarizerConfig,
};
pub use error::{EngineError, Result};
pub use extract::ContentExtractor;
pub use language::{detect_language, LanguageService};
pub use matching::{tokenize, RelevanceMatcher};
pub use retry::{execute_with_retry, Backoff, RetryPolicy};
pub use stores::{HttpReferenceStore, MemoryFeedbackStore, MemoryReferenceStore};
pub use summarize::Summarizer;
pub use traits::{
    ai::{CompletionRequest, Purpose, AI},
    corpus::ReferenceStore,
    feedback::{FeedbackSource, NegativeExample, RejectionReason},
};
pub use types::{
    analysis::{ArticleAnalysis, BatchEntry, BatchReport, ExtractSummary},
    article::{Article, ExtractionSource, Language},
    relation::{CandidateScore, MatchOutcome, ReferenceDocument, RelationJudgment},
    summary::Summary,
    verdict::ClassificationVerdict,
};
