//! Deterministic extractive summarizer.
//!
//! Keeps the first and last sentence plus a window around the midpoint,
//! groups them into short paragraphs and pads with unused sentences until the
//! summary reaches the minimum length. Texts at or below the minimum after
//! cleaning are returned as they are. When the valid sentences cannot reach
//! the minimum, every sentence of the cleaned text is grouped instead.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::config::SummarizerConfig;
use crate::text::{char_len, collapse_whitespace};
use crate::types::summary::Summary;

lazy_static! {
    static ref DISALLOWED: Regex = Regex::new(r"[^\w\s.,!?;:()]").unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref SENTENCE_WITH_END: Regex = Regex::new(r"[^.!?]+[.!?]*").unwrap();
}

/// Collapse whitespace and drop everything but word characters and basic punctuation.
pub fn clean(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    DISALLOWED.replace_all(&collapsed, "").trim().to_string()
}

#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(config: SummarizerConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, text: &str) -> Summary {
        let cleaned = clean(text);
        if char_len(&cleaned) <= self.config.min_chars {
            return Summary::from_paragraphs(vec![cleaned]);
        }

        let sentences = self.split_sentences(&cleaned);
        if sentences.is_empty() {
            debug!("No usable sentences, grouping the whole text");
            return Summary::from_paragraphs(self.group_all(&cleaned));
        }

        let selected = self.select(&sentences);
        let mut paragraphs = self.paragraphs_for(&sentences, &selected);

        if rendered_len(&paragraphs) < self.config.min_chars {
            paragraphs = self.pad(&sentences, &selected, paragraphs);
        }

        if rendered_len(&paragraphs) < self.config.min_chars {
            debug!(
                chars = rendered_len(&paragraphs),
                "Summary below minimum after padding, grouping the whole text"
            );
            return Summary::from_paragraphs(self.group_all(&cleaned));
        }

        let summary = Summary::from_paragraphs(paragraphs);
        debug!(
            sentences = sentences.len(),
            selected = selected.len(),
            paragraphs = summary.paragraphs.len(),
            chars = summary.total_chars,
            "Summary generated"
        );
        summary
    }

    fn split_sentences<'a>(&self, cleaned: &'a str) -> Vec<&'a str> {
        SENTENCE_END
            .split(cleaned)
            .map(str::trim)
            .filter(|s| {
                let len = char_len(s);
                len > self.config.min_sentence_chars && len < self.config.max_sentence_chars
            })
            .collect()
    }

    /// Indices of the selected sentences, ascending.
    fn select(&self, sentences: &[&str]) -> Vec<usize> {
        let n = sentences.len();
        if n <= 3 {
            return (0..n).collect();
        }

        let mid = n / 2;
        let range = (n as f32 * self.config.mid_window) as usize;

        let mut selected = vec![0];
        let start = mid.saturating_sub(range).max(1);
        let end = (mid + range).min(n - 1);
        selected.extend(start..end);
        selected.push(n - 1);

        let mut chars: usize = selected.iter().map(|&i| char_len(sentences[i])).sum();
        for i in 1..n - 1 {
            if chars >= self.config.min_chars {
                break;
            }
            if !selected.contains(&i) {
                selected.push(i);
                chars += char_len(sentences[i]);
            }
        }

        selected.sort_unstable();
        selected
    }

    fn paragraphs_for(&self, sentences: &[&str], selected: &[usize]) -> Vec<String> {
        let picked: Vec<&str> = selected.iter().map(|&i| sentences[i]).collect();
        let paragraphs = self.group(&picked);

        let picked_chars: usize = picked.iter().map(|s| char_len(s)).sum();
        if paragraphs.len() < 2
            && (picked.len() > 2 || picked_chars > self.config.two_paragraph_chars)
            && picked.len() > 1
        {
            let split = picked.len().div_ceil(2).max(1);
            return vec![terminate(&picked[..split]), terminate(&picked[split..])];
        }
        paragraphs
    }

    /// Greedy grouping under the per-paragraph character and sentence caps.
    fn group(&self, sentences: &[&str]) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0;

        for sentence in sentences {
            let add = char_len(sentence) + 2;
            let overflow = current_len + add > self.config.max_paragraph_chars
                || current.len() >= self.config.max_paragraph_sentences;
            if overflow && !current.is_empty() {
                paragraphs.push(terminate(&current));
                current.clear();
                current_len = 0;
            }
            current.push(sentence);
            current_len += add;
        }
        if !current.is_empty() {
            paragraphs.push(terminate(&current));
        }
        paragraphs
    }

    /// Append unused sentences, grouped the same way, until the floor is met.
    fn pad(&self, sentences: &[&str], selected: &[usize], base: Vec<String>) -> Vec<String> {
        let mut extra: Vec<&str> = Vec::new();
        for (i, sentence) in sentences.iter().enumerate() {
            if selected.contains(&i) {
                continue;
            }
            extra.push(sentence);

            let mut candidate = base.clone();
            candidate.extend(self.group(&extra));
            if rendered_len(&candidate) >= self.config.min_chars {
                return candidate;
            }
        }

        let mut padded = base;
        padded.extend(self.group(&extra));
        padded
    }
}

impl Summarizer {
    /// Every sentence of `cleaned`, punctuation kept, under the paragraph caps.
    ///
    /// Pieces are joined with at least the whitespace that separated them, so
    /// the result is never shorter than `cleaned`.
    fn group_all(&self, cleaned: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0;

        for piece in SENTENCE_WITH_END
            .find_iter(cleaned)
            .map(|m| m.as_str().trim())
            .filter(|p| !p.is_empty())
        {
            let add = char_len(piece) + 1;
            let overflow = current_len + add > self.config.max_paragraph_chars
                || current.len() >= self.config.max_paragraph_sentences;
            if overflow && !current.is_empty() {
                paragraphs.push(close(&current));
                current.clear();
                current_len = 0;
            }
            current.push(piece);
            current_len += add;
        }
        if !current.is_empty() {
            paragraphs.push(close(&current));
        }
        paragraphs
    }
}

/// Join pieces that already carry their punctuation, terminating the last one.
fn close(pieces: &[&str]) -> String {
    let joined = pieces.join(" ");
    if joined.ends_with(['.', '!', '?']) {
        joined
    } else {
        format!("{}.", joined)
    }
}

fn terminate(sentences: &[&str]) -> String {
    let joined = sentences.join(". ");
    if joined.ends_with('.') {
        joined
    } else {
        format!("{}.", joined)
    }
}

fn rendered_len(paragraphs: &[String]) -> usize {
    let separators = paragraphs.len().saturating_sub(1) * 2;
    paragraphs.iter().map(|p| char_len(p)).sum::<usize>() + separators
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sentence(i: usize) -> String {
        format!(
            "La planta número {} de hidrógeno verde reduce emisiones en la región patagónica",
            i
        )
    }

    fn article(sentences: usize) -> String {
        (0..sentences)
            .map(sentence)
            .collect::<Vec<_>>()
            .join(". ")
            + "."
    }

    #[test]
    fn test_short_text_is_returned_cleaned() {
        let summarizer = Summarizer::default();
        let summary = summarizer.summarize("  Una noticia   corta sobre energía solar — sin más.  ");
        assert_eq!(summary.paragraphs, vec!["Una noticia corta sobre energía solar  sin más."]);
    }

    #[test]
    fn test_long_text_meets_floor_with_paragraphs() {
        let summarizer = Summarizer::default();
        let summary = summarizer.summarize(&article(30));

        assert!(summary.total_chars >= 500);
        assert!(summary.paragraphs.len() >= 2);
        for paragraph in &summary.paragraphs {
            assert!(paragraph.ends_with('.'));
            assert!(char_len(paragraph) <= 600 + 2);
        }
        assert!(summary.paragraphs[0].starts_with(&sentence(0)));
        assert!(summary.text().contains(&sentence(29)));
    }

    #[test]
    fn test_selection_keeps_first_last_and_middle_window() {
        let summarizer = Summarizer::default();
        let owned: Vec<String> = (0..10).map(sentence).collect();
        let sentences: Vec<&str> = owned.iter().map(String::as_str).collect();

        let selected = summarizer.select(&sentences);
        // mid = 5, range = 3 -> 2..8, plus first and last
        assert_eq!(selected, vec![0, 2, 3, 4, 5, 6, 7, 9]);
    }

    #[test]
    fn test_few_sentences_are_forced_into_two_paragraphs() {
        let summarizer = Summarizer::default();
        let owned: Vec<String> = (0..3).map(sentence).collect();
        let sentences: Vec<&str> = owned.iter().map(String::as_str).collect();

        let paragraphs = summarizer.paragraphs_for(&sentences, &[0, 1, 2]);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1], format!("{}.", sentence(2)));
    }

    fn assert_grouped(summary: &Summary, config: &SummarizerConfig) {
        for paragraph in &summary.paragraphs {
            assert!(char_len(paragraph) <= config.max_paragraph_chars + 2, "{}", paragraph);
            assert!(paragraph.ends_with(['.', '!', '?']), "{}", paragraph);
            let sentences = SENTENCE_END.find_iter(paragraph).count();
            assert!(sentences <= config.max_paragraph_sentences, "{}", paragraph);
        }
    }

    #[test]
    fn test_short_valid_sentences_are_selected_and_grouped() {
        let text = (0..40)
            .map(|i| format!("Frase corta numero {:02} aqui", i))
            .collect::<Vec<_>>()
            .join(". ");
        let config = SummarizerConfig::default();
        let summary = Summarizer::new(config.clone()).summarize(&text);

        assert!(summary.total_chars >= 500);
        assert!(summary.paragraphs.len() > 1);
        assert!(summary.text().starts_with("Frase corta numero 00 aqui"));
        assert!(summary.text().ends_with("Frase corta numero 39 aqui."));
        assert_grouped(&summary, &config);
    }

    #[test]
    fn test_text_without_valid_sentences_is_grouped_not_returned_raw() {
        let text = "Hola mundo verde. ".repeat(40) + "sin punto final";
        let config = SummarizerConfig::default();
        let summary = Summarizer::new(config.clone()).summarize(&text);

        assert!(summary.total_chars >= char_len(&clean(&text)));
        assert!(summary.paragraphs.len() > 1);
        assert!(summary.text().ends_with("sin punto final."));
        assert_grouped(&summary, &config);
    }

    proptest! {
        #[test]
        fn prop_summary_floor(words in prop::collection::vec("[a-záéñ]{2,9}", 60..400), every in 5usize..20) {
            let text = words
                .iter()
                .enumerate()
                .map(|(i, w)| if i % every == every - 1 { format!("{}.", w) } else { w.clone() })
                .collect::<Vec<_>>()
                .join(" ");

            let cleaned = clean(&text);
            let summary = Summarizer::default().summarize(&text);

            if char_len(&cleaned) > 500 {
                prop_assert!(summary.total_chars >= 500);
                for paragraph in &summary.paragraphs {
                    prop_assert!(paragraph.ends_with(['.', '!', '?']));
                }
            } else {
                prop_assert_eq!(summary.text(), cleaned);
            }
        }
    }
}
