//! Matcher, cache and verdict properties through the public API.

mod common;

use std::sync::Arc;

use climatech::testing::{MockAI, MockAICall};
use climatech::{
    parse_verdict, ClimatechClassifier, EmbeddingCache, MatcherConfig, MemoryFeedbackStore,
    Purpose, RelevanceMatcher, Summarizer, Verdict,
};
use common::*;

fn summary() -> String {
    Summarizer::default().summarize(&WIND_FARM.join(" ")).text()
}

#[tokio::test]
async fn test_identical_text_is_embedded_once() {
    let ai = MockAI::new();
    let cache = EmbeddingCache::in_memory();

    let first = cache.get_or_embed(&ai, "captura de carbono en Gijón").await.unwrap();
    let second = cache.get_or_embed(&ai, "captura de carbono en Gijón").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ai.embed_count(), 1);
}

#[tokio::test]
async fn test_repeated_runs_reuse_cached_embeddings() {
    let ai = Arc::new(
        MockAI::new().with_default(Purpose::Judge, judge_reply("SI", SPECIFIC_RATIONALE, 90)),
    );
    let feedback = MemoryFeedbackStore::new()
        .with_negative("Newsletter sobre minería de cobre en San Juan")
        .with_negative("Newsletter sobre autos eléctricos en Brasil");
    let matcher = RelevanceMatcher::new(
        ai.clone(),
        Arc::new(EmbeddingCache::in_memory()),
        MatcherConfig::default(),
    )
    .with_feedback(Arc::new(feedback));

    let documents = vec![wind_farm_newsletter("w-1")];
    let summary = summary();

    let first = matcher.match_summary(&summary, &documents).await;
    let embeds_after_first = ai.embed_count();
    // summary + 2 negatives + 1 candidate
    assert_eq!(embeds_after_first, 4);

    let second = matcher.match_summary(&summary, &documents).await;
    assert_eq!(ai.embed_count(), embeds_after_first);
    assert_eq!(first, second);
    assert_eq!(matcher.cache().len(), 4);
}

#[tokio::test]
async fn test_at_most_three_accepted_judgments() {
    let ai = Arc::new(
        MockAI::new().with_default(Purpose::Judge, judge_reply("SI", SPECIFIC_RATIONALE, 77)),
    );
    let matcher = RelevanceMatcher::new(
        ai.clone(),
        Arc::new(EmbeddingCache::in_memory()),
        MatcherConfig::default(),
    );
    let documents: Vec<_> = (0..6)
        .map(|i| wind_farm_newsletter(&format!("w-{}", i)))
        .collect();

    let outcome = matcher.match_summary(&summary(), &documents).await;

    assert_eq!(outcome.judgments.len(), 3);
    assert!(outcome
        .judgments
        .iter()
        .all(|j| j.related && j.score >= 50 && !j.rejected_as_generic));
    // six candidates fit under the default cap of eight
    assert_eq!(ai.completion_count(Purpose::Judge), 6);
}

#[tokio::test]
async fn test_candidate_cap_limits_model_calls() {
    let ai = Arc::new(MockAI::new());
    let matcher = RelevanceMatcher::new(
        ai.clone(),
        Arc::new(EmbeddingCache::in_memory()),
        MatcherConfig::default().with_max_candidates(2),
    );
    let documents: Vec<_> = (0..5)
        .map(|i| wind_farm_newsletter(&format!("w-{}", i)))
        .collect();

    matcher.match_summary(&summary(), &documents).await;

    let judged = ai
        .calls()
        .iter()
        .filter(|c| matches!(c, MockAICall::Complete { purpose: Purpose::Judge, .. }))
        .count();
    assert_eq!(judged, 2);
}

#[test]
fn test_verdict_examples() {
    assert_eq!(
        parse_verdict("SI, es un tema de captura de carbono.").verdict,
        Verdict::Positive
    );
    assert_eq!(
        parse_verdict("No, esta noticia es sobre deportes.").verdict,
        Verdict::Negative
    );

    let fallback = parse_verdict("Considero que la nota pertenece al universo climatech.");
    assert_eq!(fallback.verdict, Verdict::Positive);
    assert_eq!(fallback.rule, Some("keyword heuristic"));
}

#[tokio::test]
async fn test_classifier_exhaustion_reports_classification_error() {
    let classifier = ClimatechClassifier::new(Arc::new(MockAI::new().with_failure(Purpose::Classify)));
    let verdict = classifier.classify(&WIND_FARM.join(" ")).await;

    assert!(!verdict.is_match);
    assert_eq!(verdict.rationale, "classification error");
}
