//! Language detection and translation.
//!
//! Detection is a word-frequency heuristic: English marker words must
//! outnumber Spanish ones by more than 1.5x, otherwise the text is Spanish.
//! Translation goes through the AI in chunks and never fails the pipeline;
//! on error the original text is kept.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LanguageConfig;
use crate::error::{EngineError, Result};
use crate::prompts;
use crate::text::char_len;
use crate::traits::ai::{CompletionRequest, Purpose, AI};
use crate::types::article::{Article, Language};

const ENGLISH_MARKERS: &[&str] = &[
    "the", "and", "is", "are", "was", "were", "this", "that", "with", "for", "from", "have", "has",
    "had", "will", "would", "could", "should", "can", "may", "might", "must", "been", "being",
    "their", "there", "these", "those", "which", "what", "when", "where", "why", "how", "who",
    "whom", "whose",
];

const SPANISH_MARKERS: &[&str] = &[
    "el", "la", "los", "las", "de", "del", "en", "un", "una", "unos", "unas", "es", "son", "era",
    "eran", "fue", "fueron", "ser", "estar", "tener", "haber", "hacer", "poder", "deber", "querer",
    "decir", "ver", "saber", "conocer", "este", "esta", "estos", "estas", "ese", "esa", "esos",
    "esas", "aquel", "aquella", "aquellos", "aquellas", "que", "cual", "cuales", "quien",
    "quienes", "cuando", "donde", "como", "porque",
];

const DOMINANCE: f32 = 1.5;

lazy_static! {
    static ref ENGLISH_SET: HashSet<&'static str> = ENGLISH_MARKERS.iter().copied().collect();
    static ref SPANISH_SET: HashSet<&'static str> = SPANISH_MARKERS.iter().copied().collect();
    static ref ENGLISH_PATTERN: Regex = Regex::new(
        r"(?i)\b(the|and|is|are|was|were|this|that|with|for|from|have|has|had|will|would|could|should)\b"
    )
    .unwrap();
    static ref SPANISH_PATTERN: Regex = Regex::new(
        r"(?i)\b(el|la|los|las|de|del|en|un|una|es|son|era|eran|fue|fueron|con|por|para|que|cual)\b"
    )
    .unwrap();
}

/// Detect whether `text` is Spanish or English. Ties and empty input are Spanish.
pub fn detect_language(text: &str) -> Language {
    let lower = text.to_lowercase();
    let words: Vec<String> = lower
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(|w| {
            w.chars()
                .filter(|c| c.is_ascii_lowercase() || "áéíóúñü".contains(*c))
                .collect()
        })
        .collect();
    if words.is_empty() {
        return Language::Spanish;
    }

    let english = words.iter().filter(|w| ENGLISH_SET.contains(w.as_str())).count();
    let spanish = words.iter().filter(|w| SPANISH_SET.contains(w.as_str())).count();
    if english as f32 > spanish as f32 * DOMINANCE {
        return Language::English;
    }

    let english = ENGLISH_PATTERN.find_iter(text).count();
    let spanish = SPANISH_PATTERN.find_iter(text).count();
    if english as f32 > spanish as f32 * DOMINANCE {
        return Language::English;
    }

    Language::Spanish
}

/// Split `text` into pieces of at most `size` characters.
fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Detects language and translates English text into Spanish.
pub struct LanguageService<A: AI> {
    ai: Arc<A>,
    config: LanguageConfig,
}

impl<A: AI> LanguageService<A> {
    pub fn new(ai: Arc<A>, config: LanguageConfig) -> Self {
        Self { ai, config }
    }

    pub fn detect(&self, text: &str) -> Language {
        detect_language(text)
    }

    /// Translate into Spanish, returning the original text on any failure.
    pub async fn translate(&self, text: &str) -> String {
        match self.try_translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(error = %e, "Translation failed, keeping original text");
                text.to_string()
            }
        }
    }

    /// Translate into Spanish, surfacing failures as [`EngineError::Translation`].
    pub async fn try_translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let total = char_len(text);
        if total <= self.config.chunk_chars {
            return self.translate_piece(text, false).await;
        }

        let chunks = chunk_chars(text, self.config.chunk_chars);
        info!(chars = total, chunks = chunks.len(), "Translating long text in chunks");

        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(chunk = i + 1, of = chunks.len(), "Translating chunk");
            translated.push(self.translate_piece(chunk, true).await?);
            if i + 1 < chunks.len() {
                tokio::time::sleep(Duration::from_millis(self.config.chunk_delay_ms)).await;
            }
        }
        Ok(translated.join(" "))
    }

    async fn translate_piece(&self, text: &str, chunked: bool) -> Result<String> {
        let request = CompletionRequest::new(Purpose::Translate)
            .system(prompts::TRANSLATE_SYSTEM)
            .user(prompts::format_translate_prompt(text, chunked))
            .temperature(self.config.temperature);

        self.ai
            .complete(request)
            .await
            .map_err(|e| EngineError::Translation(e.to_string()))
    }

    /// Translate an English article's body, and its title when that is English too.
    pub async fn localize(&self, article: &mut Article) {
        article.language = self.detect(&article.body_text);
        if article.language.is_target() {
            return;
        }

        info!(url = %article.url, "Article is in English, translating");
        let body = self.translate(&article.body_text).await;
        if body != article.body_text {
            article.translated = true;
            article.body_text = body;
        }

        if !self.detect(&article.title).is_target() {
            article.title = self.translate(&article.title).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;

    const ENGLISH: &str = "The company said that the new plant will be built with support from the government, and that it would have been impossible without these funds.";
    const SPANISH: &str = "La empresa dijo que la nueva planta será construida con el apoyo del gobierno y que no hubiera sido posible sin estos fondos.";

    #[test]
    fn test_detects_english_and_spanish() {
        assert_eq!(detect_language(ENGLISH), Language::English);
        assert_eq!(detect_language(SPANISH), Language::Spanish);
    }

    #[test]
    fn test_empty_and_ambiguous_default_to_spanish() {
        assert_eq!(detect_language(""), Language::Spanish);
        assert_eq!(detect_language("COP28 Dubai 2023"), Language::Spanish);
    }

    #[test]
    fn test_chunking_is_char_safe() {
        let chunks = chunk_chars("ñandú", 2);
        assert_eq!(chunks, vec!["ña", "nd", "ú"]);
    }

    #[tokio::test]
    async fn test_failure_returns_original() {
        let ai = Arc::new(MockAI::new().with_failure(Purpose::Translate));
        let service = LanguageService::new(ai, LanguageConfig::default());
        assert_eq!(service.translate(ENGLISH).await, ENGLISH);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_text_is_translated_per_chunk() {
        let ai = Arc::new(MockAI::new().with_default(Purpose::Translate, "traducido"));
        let service = LanguageService::new(
            ai.clone(),
            LanguageConfig {
                chunk_chars: 100,
                ..Default::default()
            },
        );

        let text = "word ".repeat(50);
        let translated = service.translate(&text).await;

        assert_eq!(ai.completion_count(Purpose::Translate), 3);
        assert_eq!(translated, "traducido traducido traducido");
    }

    #[tokio::test]
    async fn test_localize_translates_english_article() {
        let ai = Arc::new(
            MockAI::new()
                .with_rule(Purpose::Translate, "The company said", SPANISH)
                .with_rule(Purpose::Translate, "Green hydrogen is", "El hidrógeno verde es el futuro"),
        );
        let service = LanguageService::new(ai, LanguageConfig::default());

        let mut article = Article::new(
            "https://example.com/h2",
            "Green hydrogen is the future of the steel industry",
            ENGLISH,
        );
        service.localize(&mut article).await;

        assert!(article.translated);
        assert_eq!(article.language, Language::English);
        assert_eq!(article.body_text, SPANISH);
        assert_eq!(article.title, "El hidrógeno verde es el futuro");
    }
}
