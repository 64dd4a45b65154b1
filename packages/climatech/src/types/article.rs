//! Extracted article types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Language of an article as far as the engine cares.
///
/// Spanish is the working language; English text is translated into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
        }
    }

    /// Whether text in this language needs no translation.
    pub fn is_target(&self) -> bool {
        matches!(self, Language::Spanish)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Where the page content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// Fetched from the origin server
    Direct,
    /// Rendered by the url-to-text reader proxy
    ReaderProxy,
}

/// An article extracted from a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub url: String,

    /// Markup (or reader text) the article was parsed from
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_html: String,

    pub title: String,

    /// Paragraphs joined by a blank line
    pub body_text: String,

    pub site_name: Option<String>,
    pub author: Option<String>,

    /// Publication date as found in the page
    pub published_raw: Option<String>,
    pub published_at: Option<DateTime<Utc>>,

    pub language: Language,
    pub source: ExtractionSource,

    /// Body (and possibly title) were machine translated
    #[serde(default)]
    pub translated: bool,
}

impl Article {
    pub fn new(url: impl Into<String>, title: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_html: String::new(),
            title: title.into(),
            body_text: body_text.into(),
            site_name: None,
            author: None,
            published_raw: None,
            published_at: None,
            language: Language::Spanish,
            source: ExtractionSource::Direct,
            translated: false,
        }
    }

    /// Record the raw publication date and parse it if possible.
    pub fn with_published(mut self, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        self.published_at = parse_published(&raw);
        self.published_raw = Some(raw);
        self
    }
}

/// Parse RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_published_formats() {
        let rfc = parse_published("2024-05-02T10:30:00-03:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-05-02T13:30:00+00:00");

        let date = parse_published("2024-05-02").unwrap();
        assert_eq!(date.day(), 2);

        assert!(parse_published("ayer").is_none());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Spanish.code(), "es");
        assert!(!Language::English.is_target());
    }
}
