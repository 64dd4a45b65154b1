//! Narrative enrichment for accepted relations.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::prompts;
use crate::text::{char_len, collapse_whitespace};
use crate::traits::ai::{CompletionRequest, Purpose, AI};

/// Sentences longer than this close a paragraph on their own.
const LONG_SENTENCE_CHARS: usize = 180;

lazy_static! {
    static ref BLANK_LINES: Regex = Regex::new(r"\n{2,}").unwrap();
    static ref SENTENCE: Regex = Regex::new(r"[^.!?]+[.!?]?").unwrap();
}

/// Ask the model for a longer explanation of why the two texts relate.
pub async fn explain<A: AI + ?Sized>(ai: &A, summary: &str, document: &str) -> Result<String> {
    let request = CompletionRequest::new(Purpose::Explain)
        .system(prompts::EXPLAIN_SYSTEM)
        .user(prompts::format_explain_prompt(summary, document))
        .temperature(0.2);
    ai.complete(request).await
}

/// Normalise a narrative into blank-line separated paragraphs.
///
/// Existing blank-line paragraphs are kept; otherwise each line becomes a
/// paragraph; a single block is split into pairs of sentences.
pub fn format_explanation(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return String::new();
    }

    let blocks = non_empty(BLANK_LINES.split(normalized));
    if blocks.len() > 1 {
        return blocks.join("\n\n");
    }

    let lines = non_empty(normalized.split('\n'));
    if lines.len() > 1 {
        return lines.join("\n\n");
    }

    let mut paragraphs = Vec::new();
    let mut buffer: Vec<String> = Vec::new();
    for sentence in SENTENCE.find_iter(normalized) {
        let sentence = collapse_whitespace(sentence.as_str());
        if sentence.is_empty() {
            continue;
        }
        let long = char_len(&sentence) > LONG_SENTENCE_CHARS;
        buffer.push(sentence);
        if buffer.len() >= 2 || long {
            paragraphs.push(buffer.join(" "));
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        paragraphs.push(buffer.join(" "));
    }
    paragraphs.join("\n\n")
}

fn non_empty<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(collapse_whitespace)
        .filter(|p| !p.is_empty())
        .collect()
}
