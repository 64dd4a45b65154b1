//! Article extraction: fetch a URL and turn the page into an [`Article`].

pub mod fetch;
pub mod html;

pub use fetch::{FetchedPage, PageFetcher};
pub use html::{parse_page, ParsedPage};

use tracing::info;
use url::Url;

use crate::config::ExtractorConfig;
use crate::error::{EngineError, Result};
use crate::types::article::{Article, ExtractionSource};

/// Title used when a page has none.
pub const UNTITLED: &str = "Sin título";

/// Fetches article pages and extracts title, body and metadata.
pub struct ContentExtractor {
    fetcher: PageFetcher,
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(&config)?,
            config,
        })
    }

    /// Fetch and extract. Fails with `Fetch` or `Extraction` errors only.
    pub async fn extract(&self, url: &str) -> Result<Article> {
        let parsed = parse_url(url)?;
        info!(url = %url, "Extracting article");

        let page = self.fetcher.fetch(parsed.as_str()).await?;
        self.extract_from(url, page.body, page.source)
    }

    /// Extract from markup that was already fetched.
    pub fn extract_from(&self, url: &str, markup: String, source: ExtractionSource) -> Result<Article> {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        let page = parse_page(&markup, &host, &self.config, source);
        if page.paragraphs.is_empty() {
            return Err(EngineError::Extraction {
                url: url.to_string(),
                reason: "no usable text found in page".to_string(),
            });
        }

        let mut article = Article::new(
            url,
            page.title.unwrap_or_else(|| UNTITLED.to_string()),
            page.paragraphs.join("\n\n"),
        );
        article.raw_html = markup;
        article.site_name = page.site_name.or_else(|| (!host.is_empty()).then(|| host.clone()));
        article.author = page.author;
        article.source = source;
        if let Some(published) = page.published {
            article = article.with_published(published);
        }

        info!(
            url = %url,
            source = ?source,
            paragraphs = page.paragraphs.len(),
            chars = article.body_text.len(),
            "Article extracted"
        );
        Ok(article)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| EngineError::Fetch {
        url: url.to_string(),
        reason: format!("invalid URL: {}", e),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(EngineError::Fetch {
            url: url.to_string(),
            reason: format!("unsupported scheme: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_urls_are_fetch_errors() {
        assert_eq!(parse_url("no es una url").unwrap_err().stage(), "fetch");
        assert_eq!(parse_url("ftp://example.com/a").unwrap_err().stage(), "fetch");
        assert!(parse_url("https://example.com/a").is_ok());
    }

    #[test]
    fn test_empty_page_is_an_extraction_error() {
        let extractor = ContentExtractor::new(ExtractorConfig::default()).unwrap();
        let err = extractor
            .extract_from("https://example.com/a", "<html><body><p>hola</p></body></html>".into(), ExtractionSource::Direct)
            .unwrap_err();
        assert_eq!(err.stage(), "extraction");
    }

    #[test]
    fn test_site_name_falls_back_to_host() {
        let extractor = ContentExtractor::new(ExtractorConfig::default()).unwrap();
        let article = extractor
            .extract_from(
                "https://www.Example.com/a",
                "<html><body><article><p>Un párrafo suficientemente largo para ser considerado cuerpo.</p></article></body></html>".into(),
                ExtractionSource::Direct,
            )
            .unwrap();
        assert_eq!(article.site_name.as_deref(), Some("www.example.com"));
        assert_eq!(article.title, UNTITLED);
    }
}
