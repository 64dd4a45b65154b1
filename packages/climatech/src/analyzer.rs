//! The analysis pipeline - main entry point of the engine.
//!
//! extract → localize (translate when English) → summarize → classify →
//! match against the reference corpus (climatech articles only).
//!
//! Only fetch and extraction failures are returned as errors. Every later
//! stage degrades into a complete [`ArticleAnalysis`] with a reason.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::cache::EmbeddingCache;
use crate::classify::{main_topic, ClimatechClassifier};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::extract::ContentExtractor;
use crate::language::LanguageService;
use crate::matching::{RelevanceMatcher, NO_DOCUMENTS};
use crate::summarize::Summarizer;
use crate::traits::ai::AI;
use crate::traits::corpus::ReferenceStore;
use crate::traits::feedback::FeedbackSource;
use crate::types::analysis::{ArticleAnalysis, BatchEntry, BatchReport, ExtractSummary};
use crate::types::article::Article;
use crate::types::relation::{MatchOutcome, ReferenceDocument};
use crate::types::verdict::ClassificationVerdict;

/// Title given to text that did not come from a page.
pub const PROVIDED_TEXT_TITLE: &str = "Texto proporcionado";

/// How articles are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationMode {
    /// Ask the generative backend
    #[default]
    Generative,
    /// Keyword list only, no backend call
    Keywords,
}

/// Runs the full pipeline over URLs or raw text.
///
/// # Example
///
/// ```rust,ignore
/// let analyzer = Analyzer::new(ai, EngineConfig::from_env()?, corpus)?;
/// let analysis = analyzer.analyze_article("https://diario.example/nota").await?;
/// println!("{} related newsletters", analysis.related_documents.len());
/// ```
pub struct Analyzer<A: AI> {
    ai: Arc<A>,
    config: EngineConfig,
    extractor: ContentExtractor,
    language: LanguageService<A>,
    summarizer: Summarizer,
    classifier: ClimatechClassifier<A>,
    matcher: RelevanceMatcher<A>,
    corpus: Arc<dyn ReferenceStore>,
    feedback: Option<Arc<dyn FeedbackSource>>,
    mode: ClassificationMode,
}

impl<A: AI> Analyzer<A> {
    /// Build every stage from `config`. Loads the embedding cache from disk
    /// when `config.cache.path` is set.
    pub fn new(ai: Arc<A>, config: EngineConfig, corpus: Arc<dyn ReferenceStore>) -> Result<Self> {
        let cache = Arc::new(EmbeddingCache::load(config.cache.clone())?);
        Ok(Self {
            extractor: ContentExtractor::new(config.extractor.clone())?,
            language: LanguageService::new(ai.clone(), config.language.clone()),
            summarizer: Summarizer::new(config.summarizer.clone()),
            classifier: ClimatechClassifier::new(ai.clone()),
            matcher: RelevanceMatcher::new(ai.clone(), cache, config.matcher.clone()),
            ai,
            config,
            corpus,
            feedback: None,
            mode: ClassificationMode::default(),
        })
    }

    /// Use `feedback` for negative examples and prompt hints.
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSource>) -> Self {
        self.matcher = self.matcher.with_feedback(feedback.clone());
        self.feedback = Some(feedback);
        self
    }

    /// Share an already loaded embedding cache.
    pub fn with_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        let mut matcher = RelevanceMatcher::new(self.ai.clone(), cache, self.config.matcher.clone());
        if let Some(feedback) = &self.feedback {
            matcher = matcher.with_feedback(feedback.clone());
        }
        self.matcher = matcher;
        self
    }

    pub fn with_classification(mut self, mode: ClassificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &EmbeddingCache {
        self.matcher.cache()
    }

    /// Fast path: extract, translate if needed, summarize.
    pub async fn extract_and_summarize(&self, url: &str) -> Result<ExtractSummary> {
        let mut article = self.extractor.extract(url).await?;
        self.language.localize(&mut article).await;
        let summary = self.summarizer.summarize(&article.body_text);
        Ok(ExtractSummary {
            title: article.title,
            summary,
        })
    }

    /// Full pipeline for one URL.
    pub async fn analyze_article(&self, url: &str) -> Result<ArticleAnalysis> {
        let article = self.extractor.extract(url).await?;
        Ok(self.analyze(article, Some(url.to_string())).await)
    }

    /// Full pipeline for text that did not come from a URL.
    pub async fn analyze_text(&self, title: Option<&str>, text: &str) -> Result<ArticleAnalysis> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EngineError::Extraction {
                url: String::new(),
                reason: "empty text".to_string(),
            });
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(PROVIDED_TEXT_TITLE);
        Ok(self.analyze(Article::new("", title, text), None).await)
    }

    /// Analyse URLs one after another. Per-URL failures are recorded in the
    /// report and never stop the batch.
    pub async fn analyze_batch<S: AsRef<str>>(&self, urls: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut seen = HashSet::new();

        for raw in urls {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let url = normalize_link(raw);
            if !seen.insert(url.clone()) {
                info!(url = %url, "Skipping duplicate URL");
                report.duplicates.push(raw.to_string());
                continue;
            }

            let entry = match self.analyze_article(&url).await {
                Ok(analysis) => BatchEntry {
                    url,
                    analysis: Some(analysis),
                    error: None,
                },
                Err(e) => {
                    warn!(url = %url, stage = e.stage(), error = %e, "Article failed");
                    BatchEntry {
                        url,
                        analysis: None,
                        error: Some(format!("{}: {}", e.stage(), e)),
                    }
                }
            };
            report.entries.push(entry);
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            duplicates = report.duplicates.len(),
            "Batch finished"
        );
        report
    }

    /// Matcher only, for callers that already have a summary.
    pub async fn match_against_corpus(
        &self,
        summary: &str,
        documents: &[ReferenceDocument],
    ) -> MatchOutcome {
        self.matcher.match_summary(summary, documents).await
    }

    pub async fn classify(&self, text: &str) -> ClassificationVerdict {
        match self.mode {
            ClassificationMode::Generative => self.classifier.classify(text).await,
            ClassificationMode::Keywords => self.classifier.classify_offline(text),
        }
    }

    async fn analyze(&self, mut article: Article, url: Option<String>) -> ArticleAnalysis {
        self.language.localize(&mut article).await;
        let summary = self.summarizer.summarize(&article.body_text);
        let verdict = self.classify(&article.body_text).await;

        let mut analysis = ArticleAnalysis {
            url,
            title: article.title.clone(),
            author: article.author.clone(),
            site_name: article.site_name.clone(),
            published_at: article.published_at,
            language: article.language,
            translated: article.translated,
            summary,
            is_match: verdict.is_match,
            match_rationale: verdict.rationale,
            related_documents: Vec::new(),
            no_match_reason: None,
            main_topic: None,
        };

        if !analysis.is_match {
            analysis.main_topic = Some(main_topic(&article.body_text).to_string());
            analysis.no_match_reason = Some("article is not climatech".to_string());
            info!(title = %analysis.title, topic = ?analysis.main_topic, "Article is not climatech");
            return analysis;
        }

        let documents = match self.corpus.reference_documents().await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "Reference documents unavailable");
                Vec::new()
            }
        };
        if documents.is_empty() {
            analysis.no_match_reason = Some(NO_DOCUMENTS.to_string());
            return analysis;
        }

        let outcome = self
            .matcher
            .match_summary(&analysis.summary.text(), &documents)
            .await;
        analysis.related_documents = outcome.judgments;
        analysis.no_match_reason = outcome.no_match_reason;

        info!(
            title = %analysis.title,
            related = analysis.related_documents.len(),
            "Article analysed"
        );
        analysis
    }

    /// Persist the embedding cache now.
    pub async fn flush(&self) -> Result<()> {
        self.matcher.cache().flush().await
    }
}

const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid"];

/// Drop tracking parameters (`utm_*`, `fbclid`, `gclid`) and the fragment.
/// Unparseable input is returned trimmed.
pub fn normalize_link(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryReferenceStore;
    use crate::testing::MockAI;
    use crate::traits::ai::Purpose;

    fn analyzer(ai: MockAI, documents: Vec<ReferenceDocument>) -> (Arc<MockAI>, Analyzer<MockAI>) {
        let ai = Arc::new(ai);
        let corpus = Arc::new(MemoryReferenceStore::new(documents));
        let analyzer = Analyzer::new(ai.clone(), EngineConfig::default(), corpus).unwrap();
        (ai, analyzer)
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(
            normalize_link("https://diario.example/nota?utm_source=x&id=4&fbclid=abc#top"),
            "https://diario.example/nota?id=4"
        );
        assert_eq!(
            normalize_link("https://diario.example/nota?UTM_medium=y&gclid=1"),
            "https://diario.example/nota"
        );
        assert_eq!(normalize_link(" no es url "), "no es url");
    }

    #[tokio::test]
    async fn test_non_climatech_text_reports_topic() {
        let (ai, analyzer) = analyzer(MockAI::new(), vec![]);
        let analysis = analyzer
            .analyze_text(None, "El jugador convirtió un gol en el partido de la liga.")
            .await
            .unwrap();

        assert!(!analysis.is_match);
        assert_eq!(analysis.title, PROVIDED_TEXT_TITLE);
        assert_eq!(analysis.main_topic.as_deref(), Some("deportes"));
        assert!(analysis.no_match_reason.is_some());
        assert_eq!(ai.completion_count(Purpose::Judge), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_is_reported() {
        let (_, analyzer) = analyzer(
            MockAI::new().with_default(Purpose::Classify, "SI. Trata sobre energía solar."),
            vec![],
        );
        let analysis = analyzer
            .analyze_text(Some("Solar"), "Una planta de energía solar en San Juan.")
            .await
            .unwrap();

        assert!(analysis.is_match);
        assert!(analysis.main_topic.is_none());
        assert_eq!(analysis.no_match_reason.as_deref(), Some(NO_DOCUMENTS));
    }

    #[tokio::test]
    async fn test_keyword_mode_skips_the_backend() {
        let (ai, analyzer) = analyzer(MockAI::new(), vec![]);
        let analyzer = analyzer.with_classification(ClassificationMode::Keywords);

        let verdict = analyzer.classify("Financiamiento para movilidad sostenible").await;
        assert!(verdict.is_match);
        assert_eq!(ai.completion_count(Purpose::Classify), 0);
    }

    #[tokio::test]
    async fn test_blank_text_is_an_extraction_error() {
        let (_, analyzer) = analyzer(MockAI::new(), vec![]);
        let err = analyzer.analyze_text(None, "   ").await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_batch_records_failures_and_duplicates() {
        let (_, analyzer) = analyzer(MockAI::new(), vec![]);
        let report = analyzer
            .analyze_batch(&[
                "ftp://diario.example/a",
                "ftp://diario.example/a?utm_source=tw",
                "",
            ])
            .await;

        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.duplicates, vec!["ftp://diario.example/a?utm_source=tw"]);
        assert!(report.entries[0].error.as_ref().unwrap().starts_with("fetch:"));
    }
}
