//! Stage 1: lexical pre-filter.
//!
//! A document becomes a candidate when it shares enough distinct tokens with
//! the summary, either together with enough climatech keywords or on token
//! overlap alone. Candidates are ranked and capped before any model call.

use std::collections::HashSet;
use tracing::debug;

use crate::classify::keywords::shared_keywords;
use crate::config::MatcherConfig;
use crate::text::normalize;
use crate::types::relation::{CandidateScore, ReferenceDocument};

use super::tokenize::tokenize;

/// A document that passed the pre-filter, with its lexical score.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub document: &'a ReferenceDocument,
    pub score: CandidateScore,
}

/// Score one document against the summary.
pub fn score_document(
    summary_tokens: &HashSet<String>,
    summary_normalized: &str,
    document: &ReferenceDocument,
    config: &MatcherConfig,
) -> CandidateScore {
    let text = document.text();
    let document_tokens: HashSet<String> = tokenize(&text).into_iter().collect();

    let token_overlap = summary_tokens
        .iter()
        .filter(|t| t.len() > config.overlap_token_min_chars && document_tokens.contains(*t))
        .count();
    let keyword_cooccurrence = shared_keywords(summary_normalized, &normalize(&text));

    CandidateScore {
        document_id: document.id.clone(),
        token_overlap,
        keyword_cooccurrence,
    }
}

pub fn is_candidate(score: &CandidateScore, config: &MatcherConfig) -> bool {
    (score.token_overlap >= config.min_token_overlap
        && score.keyword_cooccurrence >= config.min_keyword_cooccurrence)
        || score.token_overlap >= config.strong_token_overlap
}

/// Candidates for `summary`, best first, at most `config.max_candidates`.
pub fn select_candidates<'a>(
    summary: &str,
    documents: &'a [ReferenceDocument],
    config: &MatcherConfig,
) -> Vec<Candidate<'a>> {
    let summary_tokens: HashSet<String> = tokenize(summary).into_iter().collect();
    let summary_normalized = normalize(summary);

    let mut candidates: Vec<Candidate<'a>> = documents
        .iter()
        .filter_map(|document| {
            let score = score_document(&summary_tokens, &summary_normalized, document, config);
            if is_candidate(&score, config) {
                debug!(
                    document_id = %document.id,
                    tokens = score.token_overlap,
                    keywords = score.keyword_cooccurrence,
                    "Candidate"
                );
                Some(Candidate { document, score })
            } else {
                None
            }
        })
        .collect();

    // stable: equal ranks keep corpus order
    candidates.sort_by(|a, b| b.score.rank().cmp(&a.score.rank()));
    candidates.truncate(config.max_candidates.max(1));

    debug!(
        candidates = candidates.len(),
        corpus = documents.len(),
        "Lexical pre-filter done"
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(prefix: &str, n: usize) -> String {
        (0..n)
            .map(|i| format!("{}{}", prefix, i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_thresholds() {
        let config = MatcherConfig::default();
        let score = |overlap, keywords| CandidateScore {
            document_id: "d".into(),
            token_overlap: overlap,
            keyword_cooccurrence: keywords,
        };

        assert!(is_candidate(&score(15, 2), &config));
        assert!(!is_candidate(&score(15, 1), &config));
        assert!(!is_candidate(&score(14, 5), &config));
        assert!(is_candidate(&score(20, 0), &config));
    }

    #[test]
    fn test_overlap_counts_distinct_long_tokens() {
        let config = MatcherConfig::default();
        let summary: HashSet<String> = tokenize("litio litio litio mina sal").into_iter().collect();
        let document = ReferenceDocument::new("1", "Litio", "mina sal litio");

        let score = score_document(&summary, "litio litio litio mina sal", &document, &config);
        // "litio" and "mina" qualify, "sal" is too short
        assert_eq!(score.token_overlap, 2);
        assert_eq!(score.keyword_cooccurrence, 1);
    }

    #[test]
    fn test_candidates_are_ranked_and_capped() {
        let config = MatcherConfig::default().with_max_candidates(2);
        let shared = words("termino", 25);
        let summary = format!("{} litio baterias", shared);

        let documents = vec![
            ReferenceDocument::new("weak", "Sin relación", "nada que ver con la noticia"),
            ReferenceDocument::new("tokens", "Tokens", shared.clone()),
            ReferenceDocument::new("both", "Litio y baterías", format!("{} litio baterias", shared)),
            ReferenceDocument::new("tokens-2", "Tokens", shared.clone()),
        ];

        let candidates = select_candidates(&summary, &documents, &config);
        let ids: Vec<&str> = candidates.iter().map(|c| c.document.id.as_str()).collect();
        assert_eq!(ids, vec!["both", "tokens"]);
    }
}
