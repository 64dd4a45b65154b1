//! Relevance matching of a summary against the reference corpus.
//!
//! Three stages, run sequentially per candidate:
//! 1. [`prefilter`]: lexical overlap narrows the corpus to a few candidates
//! 2. [`penalty`]: embedding similarity to known false positives lowers scores
//! 3. [`judge`]: the model scores each pair and [`genericity`] rejects vague
//!    justifications
//!
//! Only stage 1 can end a run early. Every other failure degrades into a
//! rejected candidate with a recorded reason.

pub mod explain;
pub mod genericity;
pub mod judge;
pub mod penalty;
pub mod prefilter;
pub mod tokenize;

pub use explain::format_explanation;
pub use genericity::{generic_reason, is_generic, DetailMarkers};
pub use judge::{ParsedJudgment, RelationPayload};
pub use penalty::{penalty_for, NegativeSignal};
pub use prefilter::{select_candidates, Candidate};
pub use tokenize::tokenize;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::EmbeddingCache;
use crate::config::MatcherConfig;
use crate::prompts;
use crate::text::truncate_chars;
use crate::traits::ai::{CompletionRequest, Purpose, AI};
use crate::traits::feedback::{FeedbackSource, NegativeExample};
use crate::types::relation::{MatchOutcome, ReferenceDocument, RelationJudgment};

pub const NO_DOCUMENTS: &str = "no reference documents available";
pub const NO_KEYWORD_OVERLAP: &str = "no relevant keyword overlap";
pub const NO_CLEAR_MATCH: &str = "no clear thematic match";
const NOT_RELATED: &str = "no shared topic or key entities";
const EVALUATION_FAILED: &str = "could not evaluate relation";
const MALFORMED_REPLY: &str = "malformed relation response";

/// Characters of a generic rationale quoted in the rejection reason.
const QUOTED_RATIONALE_CHARS: usize = 150;

/// Feedback gathered once per run.
#[derive(Debug, Default)]
struct FeedbackContext {
    negatives: Vec<NegativeExample>,
    hints: Vec<String>,
}

/// Matches summaries against reference documents.
pub struct RelevanceMatcher<A: AI> {
    ai: Arc<A>,
    cache: Arc<EmbeddingCache>,
    feedback: Option<Arc<dyn FeedbackSource>>,
    config: MatcherConfig,
    prompt_hash: String,
}

impl<A: AI> RelevanceMatcher<A> {
    pub fn new(ai: Arc<A>, cache: Arc<EmbeddingCache>, config: MatcherConfig) -> Self {
        Self {
            ai,
            cache,
            feedback: None,
            config,
            prompt_hash: prompts::judge_prompt_hash(),
        }
    }

    /// Use `feedback` for negative examples and prompt hints.
    pub fn with_feedback(mut self, feedback: Arc<dyn FeedbackSource>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `summary` against `documents`.
    ///
    /// Returns at most `max_results` accepted judgments, best first. When
    /// none qualify, `no_match_reason` is the first rejection recorded.
    pub async fn match_summary(
        &self,
        summary: &str,
        documents: &[ReferenceDocument],
    ) -> MatchOutcome {
        if documents.is_empty() {
            return MatchOutcome::no_match(NO_DOCUMENTS);
        }

        let candidates = select_candidates(summary, documents, &self.config);
        if candidates.is_empty() {
            info!(corpus = documents.len(), "No document passed the lexical pre-filter");
            return MatchOutcome::no_match(NO_KEYWORD_OVERLAP);
        }

        let feedback = self.load_feedback().await;
        let negatives =
            NegativeSignal::load(self.ai.as_ref(), &self.cache, summary, &feedback.negatives).await;

        info!(
            candidates = candidates.len(),
            corpus = documents.len(),
            negatives = negatives.len(),
            prompt_hash = %&self.prompt_hash[..12],
            "Judging candidates"
        );

        let mut accepted = Vec::new();
        let mut rejections = Vec::new();
        for candidate in &candidates {
            match self
                .judge_candidate(summary, candidate, &negatives, &feedback.hints)
                .await
            {
                Ok(judgment) => accepted.push(judgment),
                Err(reason) => rejections.push(reason),
            }
        }

        self.select(accepted, rejections)
    }

    /// Judge one candidate. `Err` carries the rejection reason.
    async fn judge_candidate(
        &self,
        summary: &str,
        candidate: &Candidate<'_>,
        negatives: &NegativeSignal,
        hints: &[String],
    ) -> std::result::Result<RelationJudgment, String> {
        let document = candidate.document;
        let document_text = document.text();

        let penalty = negatives
            .penalty(
                self.ai.as_ref(),
                &self.cache,
                &document_text,
                &self.config.penalty_tiers,
            )
            .await;

        let request = CompletionRequest::new(Purpose::Judge)
            .system(prompts::JUDGE_SYSTEM)
            .user(prompts::format_judge_prompt(summary, &document_text, hints))
            .temperature(0.2)
            .json_schema::<RelationPayload>("relation");

        let raw = match self.ai.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "Relation judgment failed");
                return Err(EVALUATION_FAILED.to_string());
            }
        };

        let payload = match ParsedJudgment::parse(&raw).into_result() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(document_id = %document.id, error = %e, "Treating reply as score 0");
                return Err(MALFORMED_REPLY.to_string());
            }
        };

        let score = payload.penalized_score(penalty);
        let rationale = payload.rationale.trim().to_string();
        debug!(
            document_id = %document.id,
            related = payload.is_related(),
            score,
            penalty,
            "Relation judged"
        );

        if !payload.is_related() {
            return Err(if rationale.is_empty() {
                NOT_RELATED.to_string()
            } else {
                rationale
            });
        }

        if let Some(why) = generic_reason(&rationale, score, &self.config) {
            info!(document_id = %document.id, score, why, "Rejected generic relation");
            return Err(format!(
                "rejected as generic: {}",
                truncate_chars(&rationale, QUOTED_RATIONALE_CHARS)
            ));
        }

        let narrative = if self.config.enrich_explanations {
            self.narrative(summary, &document_text, &rationale).await
        } else {
            rationale.clone()
        };

        Ok(RelationJudgment {
            document_id: document.id.clone(),
            document_title: document.title.clone(),
            link: document.link.clone(),
            related: true,
            score,
            penalty,
            rationale: format_explanation(&narrative),
            initial_rationale: rationale,
            rejected_as_generic: false,
        })
    }

    /// Longer explanation for an accepted relation, or `fallback` on failure.
    async fn narrative(&self, summary: &str, document_text: &str, fallback: &str) -> String {
        match explain::explain(self.ai.as_ref(), summary, document_text).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback.to_string(),
            Err(e) => {
                warn!(error = %e, "Explanation failed, keeping initial rationale");
                fallback.to_string()
            }
        }
    }

    fn select(&self, judgments: Vec<RelationJudgment>, rejections: Vec<String>) -> MatchOutcome {
        let mut accepted: Vec<RelationJudgment> = judgments
            .into_iter()
            .filter(|j| {
                let keep = j.is_accepted(self.config.accept_score);
                if !keep {
                    debug!(document_id = %j.document_id, score = j.score, "Dropped low-score relation");
                }
                keep
            })
            .collect();
        accepted.sort_by(|a, b| b.score.cmp(&a.score));
        accepted.truncate(self.config.max_results);

        info!(related = accepted.len(), "Matching finished");
        if accepted.is_empty() {
            let reason = rejections
                .into_iter()
                .next()
                .unwrap_or_else(|| NO_CLEAR_MATCH.to_string());
            return MatchOutcome::no_match(reason);
        }

        MatchOutcome {
            judgments: accepted,
            no_match_reason: None,
        }
    }

    async fn load_feedback(&self) -> FeedbackContext {
        let Some(feedback) = &self.feedback else {
            return FeedbackContext::default();
        };

        let negatives = feedback
            .negative_examples(self.config.max_negative_examples)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Negative examples unavailable");
                Vec::new()
            });

        let hints = match feedback.rejection_reasons(self.config.feedback_hint_count).await {
            Ok(reasons) => reasons
                .into_iter()
                .take(self.config.feedback_hint_count)
                .map(|r| r.reason)
                .collect(),
            Err(e) => {
                warn!(error = %e, "Rejection reasons unavailable");
                Vec::new()
            }
        };

        FeedbackContext {
            negatives: negatives
                .into_iter()
                .take(self.config.max_negative_examples)
                .collect(),
            hints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryFeedbackStore;
    use crate::testing::{MockAI, MockAICall};

    const SUMMARY: &str = "YPF Luz inauguró el parque eólico General Levalle en la provincia de Córdoba. La instalación suma 155 MW de energía renovable con turbinas Vestas y reducirá emisiones de CO2 en 400 mil toneladas anuales. La empresa invirtió 260 millones de dólares y venderá la electricidad a industrias del mercado a término.";

    const SPECIFIC: &str = "Ambos textos describen el parque eólico General Levalle de la empresa YPF Luz en Córdoba, con 155 MW instalados y turbinas Vestas.";

    fn newsletter(id: &str) -> ReferenceDocument {
        ReferenceDocument::new(id, format!("Newsletter {}", id), SUMMARY)
    }

    fn reply(related: &str, rationale: &str, score: u8) -> String {
        serde_json::json!({"relacionado": related, "razon": rationale, "score": score}).to_string()
    }

    fn build_matcher(ai: MockAI) -> (Arc<MockAI>, RelevanceMatcher<MockAI>) {
        let ai = Arc::new(ai);
        let matcher = RelevanceMatcher::new(
            ai.clone(),
            Arc::new(EmbeddingCache::in_memory()),
            MatcherConfig::default(),
        );
        (ai, matcher)
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let (_, matcher) = build_matcher(MockAI::new());
        let outcome = matcher.match_summary(SUMMARY, &[]).await;
        assert_eq!(outcome.no_match_reason.as_deref(), Some(NO_DOCUMENTS));
    }

    #[tokio::test]
    async fn test_no_candidates_skips_the_model() {
        let (ai, matcher) = build_matcher(MockAI::new());
        let documents = vec![ReferenceDocument::new("1", "Recetas", "Guiso de lentejas para el invierno")];

        let outcome = matcher.match_summary(SUMMARY, &documents).await;
        assert!(!outcome.is_match());
        assert_eq!(outcome.no_match_reason.as_deref(), Some(NO_KEYWORD_OVERLAP));
        assert!(ai.calls().is_empty());
    }

    #[tokio::test]
    async fn test_specific_relation_is_accepted() {
        let (ai, matcher) = build_matcher(
            MockAI::new().with_default(Purpose::Judge, reply("SI", SPECIFIC, 85)),
        );

        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert_eq!(outcome.judgments.len(), 1);
        let judgment = &outcome.judgments[0];
        assert_eq!(judgment.score, 85);
        assert_eq!(judgment.initial_rationale, SPECIFIC);
        // the explanation call fails in the mock, so the rationale is kept
        assert_eq!(judgment.rationale, SPECIFIC);
        assert_eq!(ai.completion_count(Purpose::Explain), 1);
        assert!(outcome.no_match_reason.is_none());
    }

    #[tokio::test]
    async fn test_enriched_narrative_is_formatted() {
        let (_, matcher) = build_matcher(
            MockAI::new()
                .with_default(Purpose::Judge, reply("SI", SPECIFIC, 85))
                .with_default(Purpose::Explain, "Primera idea. Segunda idea. Tercera idea."),
        );

        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert_eq!(
            outcome.judgments[0].rationale,
            "Primera idea. Segunda idea.\n\nTercera idea."
        );
    }

    #[tokio::test]
    async fn test_generic_relation_is_rejected() {
        let (_, matcher) = build_matcher(MockAI::new().with_default(
            Purpose::Judge,
            reply("SI", "Ambos hablan de sostenibilidad y temas similares.", 35),
        ));

        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert!(!outcome.is_match());
        assert!(outcome
            .no_match_reason
            .unwrap()
            .starts_with("rejected as generic: Ambos hablan de sostenibilidad"));
    }

    #[tokio::test]
    async fn test_failures_and_malformed_replies_are_rejections() {
        let (_, matcher) = build_matcher(MockAI::new().with_failure(Purpose::Judge));
        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert_eq!(outcome.no_match_reason.as_deref(), Some(EVALUATION_FAILED));

        let (_, matcher) = build_matcher(MockAI::new().with_default(Purpose::Judge, "SI, claramente."));
        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert_eq!(outcome.no_match_reason.as_deref(), Some(MALFORMED_REPLY));
    }

    #[tokio::test]
    async fn test_results_sorted_and_capped() {
        let (_, matcher) = build_matcher(
            MockAI::new()
                .with_rule(Purpose::Judge, "Newsletter a", reply("SI", SPECIFIC, 70))
                .with_rule(Purpose::Judge, "Newsletter b", reply("SI", SPECIFIC, 95))
                .with_rule(Purpose::Judge, "Newsletter c", reply("NO", "Otro sector.", 10))
                .with_rule(Purpose::Judge, "Newsletter d", reply("SI", SPECIFIC, 80))
                .with_rule(Purpose::Judge, "Newsletter e", reply("SI", SPECIFIC, 75)),
        );
        let documents: Vec<_> = ["a", "b", "c", "d", "e"].into_iter().map(newsletter).collect();

        let outcome = matcher.match_summary(SUMMARY, &documents).await;
        let ids: Vec<&str> = outcome.judgments.iter().map(|j| j.document_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "e"]);
        assert!(outcome
            .judgments
            .iter()
            .all(|j| j.score >= 50 && !j.rejected_as_generic));
    }

    #[tokio::test]
    async fn test_negative_example_penalty_and_hints() {
        let feedback = MemoryFeedbackStore::new()
            .with_negative(newsletter("a").text())
            .with_reason("relación solo por sector energético", 3);
        let (ai, matcher) = build_matcher(MockAI::new().with_default(Purpose::Judge, reply("SI", SPECIFIC, 70)));
        let matcher = matcher.with_feedback(Arc::new(feedback));

        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        let judgment = &outcome.judgments[0];
        assert_eq!(judgment.penalty, 12);
        assert_eq!(judgment.score, 58);

        let judge_prompt = ai
            .calls()
            .into_iter()
            .find_map(|call| match call {
                MockAICall::Complete {
                    purpose: Purpose::Judge,
                    prompt,
                } => Some(prompt),
                _ => None,
            })
            .unwrap();
        assert!(judge_prompt.contains("razones previas: relación solo por sector energético."));
    }

    #[tokio::test]
    async fn test_penalty_can_push_below_acceptance() {
        let feedback = MemoryFeedbackStore::new().with_negative(newsletter("a").text());
        let (_, matcher) = build_matcher(MockAI::new().with_default(Purpose::Judge, reply("SI", SPECIFIC, 60)));
        let matcher = matcher.with_feedback(Arc::new(feedback));

        // 60 - 12 = 48 is below the 50 acceptance score and in the 41..60 band
        let outcome = matcher.match_summary(SUMMARY, &[newsletter("a")]).await;
        assert!(!outcome.is_match());
        assert_eq!(outcome.no_match_reason.as_deref(), Some(NO_CLEAR_MATCH));
    }
}
