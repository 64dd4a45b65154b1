//! Configuration for the analysis engine.
//!
//! Every heuristic constant the pipeline relies on lives here as a named,
//! overridable field. The defaults are the empirically tuned values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::retry::RetryPolicy;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub language: LanguageConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub cache: CacheConfig,

    /// Backend serving the reference corpus (`/api/Newsletter`)
    #[serde(default)]
    pub backend_url: Option<String>,
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from the environment (and `.env` if present).
    ///
    /// Recognised variables: `CLIMATECH_MODEL`, `CLIMATECH_EMBEDDING_MODEL`,
    /// `CLIMATECH_CACHE_PATH`, `CLIMATECH_READER_PROXY`, `CLIMATECH_BACKEND_URL`
    /// and `CLIMATECH_MAX_CANDIDATES`.
    pub fn from_env() -> Result<Self> {
        warn_on_dotenv_error(dotenvy::dotenv());

        let mut config = Self::default();
        if let Ok(model) = std::env::var("CLIMATECH_MODEL") {
            config.models.chat_model = model;
        }
        if let Ok(model) = std::env::var("CLIMATECH_EMBEDDING_MODEL") {
            config.models.embedding_model = model;
        }
        if let Ok(path) = std::env::var("CLIMATECH_CACHE_PATH") {
            config.cache.path = Some(PathBuf::from(path));
        }
        if let Ok(proxy) = std::env::var("CLIMATECH_READER_PROXY") {
            config.extractor.reader_proxy_base = proxy;
        }
        if let Ok(url) = std::env::var("CLIMATECH_BACKEND_URL") {
            config.backend_url = Some(url);
        }
        if let Ok(raw) = std::env::var("CLIMATECH_MAX_CANDIDATES") {
            config.matcher.max_candidates = raw.parse().map_err(|_| {
                EngineError::Config(format!("CLIMATECH_MAX_CANDIDATES is not a number: {}", raw))
            })?;
        }
        Ok(config)
    }

    /// Set the matcher configuration.
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the embedding cache file.
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache.path = Some(path.into());
        self
    }
}

/// Model names used for generation and embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub chat_model: String,
    pub embedding_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Configuration for fetching and cleaning article pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Request timeout for direct and reader-proxy fetches.
    pub timeout_secs: u64,

    /// Browser-like user agent sent on direct fetches.
    pub user_agent: String,

    /// Accept invalid certificates on direct fetches.
    ///
    /// Default: true, so certificate-intercepting proxies do not block extraction.
    pub accept_invalid_certs: bool,

    /// Base URL of the url-to-text reader used when the origin blocks us.
    pub reader_proxy_base: String,

    /// Content-container selectors tried in order for every host.
    pub default_selectors: Vec<String>,

    /// Host-specific selector lists, matched by substring of the host name
    /// in insertion order.
    pub site_selectors: IndexMap<String, Vec<String>>,

    /// Maximum title length in characters.
    pub max_title_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let mut site_selectors = IndexMap::new();
        site_selectors.insert(
            "lanacion.com.ar".to_string(),
            to_strings(&[
                ".com-article__content",
                ".com-article__body",
                "article .com-paragraph",
                "article",
            ]),
        );

        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            accept_invalid_certs: true,
            reader_proxy_base: "https://r.jina.ai".to_string(),
            default_selectors: to_strings(&[
                "article",
                ".article",
                ".post",
                ".entry",
                ".content",
                ".story",
                ".news",
                ".main-content",
                ".post-content",
                ".article-content",
                ".entry-content",
                ".story-content",
                ".news-content",
                "[role=\"main\"]",
                "main",
            ]),
            site_selectors,
            max_title_chars: 200,
        }
    }
}

impl ExtractorConfig {
    /// Selectors for a host: the first matching override, else the defaults.
    pub fn selectors_for(&self, host: &str) -> &[String] {
        let host = host.to_lowercase();
        self.site_selectors
            .iter()
            .find(|(pattern, _)| host.contains(pattern.as_str()))
            .map(|(_, selectors)| selectors.as_slice())
            .unwrap_or(&self.default_selectors)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Add a host-specific selector override.
    pub fn with_site_selectors(
        mut self,
        host: impl Into<String>,
        selectors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.site_selectors
            .insert(host.into(), selectors.into_iter().map(Into::into).collect());
        self
    }

    /// Point the reader-proxy fallback somewhere else.
    pub fn with_reader_proxy(mut self, base: impl Into<String>) -> Self {
        self.reader_proxy_base = base.into();
        self
    }
}

/// Configuration for language detection and translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Texts longer than this are translated chunk by chunk.
    pub chunk_chars: usize,

    /// Pause between chunk translations.
    pub chunk_delay_ms: u64,

    pub temperature: f32,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 3000,
            chunk_delay_ms: 200,
            temperature: 0.3,
        }
    }
}

/// Configuration for the extractive summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Minimum summary length whenever the source is longer than this.
    pub min_chars: usize,
    pub max_paragraph_chars: usize,
    pub max_paragraph_sentences: usize,

    /// Sentences must be strictly longer than this...
    pub min_sentence_chars: usize,
    /// ...and strictly shorter than this.
    pub max_sentence_chars: usize,

    /// Half-width of the midpoint window as a fraction of the sentence count.
    pub mid_window: f32,

    /// Sources above this length (or with >2 selected sentences) get two paragraphs.
    pub two_paragraph_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            min_chars: 500,
            max_paragraph_chars: 600,
            max_paragraph_sentences: 5,
            min_sentence_chars: 20,
            max_sentence_chars: 1000,
            mid_window: 0.3,
            two_paragraph_chars: 250,
        }
    }
}

/// Thresholds for the three-stage relevance matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Overlap needed together with `min_keyword_cooccurrence`.
    pub min_token_overlap: usize,
    pub min_keyword_cooccurrence: usize,

    /// Overlap that qualifies a document on its own.
    pub strong_token_overlap: usize,

    /// Only tokens longer than this count towards overlap.
    pub overlap_token_min_chars: usize,

    /// Candidates kept after lexical ranking.
    pub max_candidates: usize,

    /// Negative examples embedded for the penalty stage.
    pub max_negative_examples: usize,

    /// Similarity tiers (strictly greater than) and their penalties, highest first.
    pub penalty_tiers: Vec<PenaltyTier>,

    /// Scores below this are generic regardless of the rationale.
    pub generic_score_floor: u8,

    /// Scores below this are generic unless two specificity markers are present.
    pub detailed_score_floor: u8,

    /// Judgments need at least this score to be returned.
    pub accept_score: u8,

    /// Rationales shorter than this are treated as generic.
    pub min_rationale_chars: usize,

    /// Generic phrases needed (without specificity markers) to reject.
    pub generic_phrase_hits: usize,

    /// Maximum judgments returned.
    pub max_results: usize,

    /// Aggregate rejection reasons quoted in the pairwise prompt.
    pub feedback_hint_count: usize,

    /// Ask the model for a longer narrative on accepted matches.
    pub enrich_explanations: bool,
}

/// One step of the negative-example penalty ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyTier {
    pub above: f32,
    pub penalty: u8,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_token_overlap: 15,
            min_keyword_cooccurrence: 2,
            strong_token_overlap: 20,
            overlap_token_min_chars: 3,
            max_candidates: 8,
            max_negative_examples: 20,
            penalty_tiers: vec![
                PenaltyTier { above: 0.83, penalty: 12 },
                PenaltyTier { above: 0.78, penalty: 8 },
                PenaltyTier { above: 0.73, penalty: 4 },
            ],
            generic_score_floor: 41,
            detailed_score_floor: 60,
            accept_score: 50,
            min_rationale_chars: 50,
            generic_phrase_hits: 2,
            max_results: 3,
            feedback_hint_count: 3,
            enrich_explanations: true,
        }
    }
}

impl MatcherConfig {
    /// Set the candidate cap.
    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = max;
        self
    }

    /// Enable or disable the narrative enrichment call.
    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_explanations = enabled;
        self
    }
}

/// Configuration for the persistent embedding cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// JSON file backing the cache; memory-only when `None`.
    pub path: Option<PathBuf>,

    /// Entry count above which the oldest entries are evicted.
    pub soft_cap: usize,

    /// Fraction of entries evicted when the cap is exceeded.
    pub evict_fraction: f32,

    /// Writes requested within this window coalesce into one.
    pub save_debounce_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            soft_cap: 5000,
            evict_fraction: 0.2,
            save_debounce_ms: 500,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A missing `.env` is normal; anything else is logged. Returns whether a
/// warning was emitted.
fn warn_on_dotenv_error<T>(result: std::result::Result<T, dotenvy::Error>) -> bool {
    match result {
        Err(e) if !e.not_found() => {
            warn!(error = %e, "Failed to load .env");
            true
        }
        _ => false,
    }
}
