//! Extractive summary type.

use serde::{Deserialize, Serialize};

/// Ordered, sentence-terminated paragraphs.
///
/// `total_chars` counts the characters of the rendered text, i.e. the
/// paragraphs joined by a blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub paragraphs: Vec<String>,
    pub total_chars: usize,
}

impl Summary {
    pub fn from_paragraphs(paragraphs: Vec<String>) -> Self {
        let paragraphs: Vec<String> = paragraphs
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let total_chars = render(&paragraphs).chars().count();
        Self {
            paragraphs,
            total_chars,
        }
    }

    /// Rendered text, paragraphs separated by a blank line.
    pub fn text(&self) -> String {
        render(&self.paragraphs)
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

fn render(paragraphs: &[String]) -> String {
    paragraphs.join("\n\n")
}
