//! Page fetching with a reader-proxy fallback.
//!
//! The direct fetch uses browser-like headers and tolerates intercepting
//! proxies. When the origin refuses us (non-2xx, certificate or connection
//! error) the page is requested once more through a url-to-text reader.

use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::error::{EngineError, Result};
use crate::types::article::ExtractionSource;

/// Body of a fetched page and where it came from.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub source: ExtractionSource,
}

/// HTTP fetcher for article pages.
pub struct PageFetcher {
    client: reqwest::Client,
    reader_base: String,
}

impl PageFetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("es-ES,es;q=0.9,en;q=0.8"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::DNT, HeaderValue::from_static("1"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| EngineError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            reader_base: config.reader_proxy_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch directly, then through the reader proxy.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let direct_failure = match self.fetch_text(url).await {
            Ok(body) => {
                return Ok(FetchedPage {
                    body,
                    source: ExtractionSource::Direct,
                })
            }
            Err(reason) => reason,
        };

        let reader_url = self.reader_url(url);
        warn!(
            url = %url,
            reason = %direct_failure,
            "Direct fetch failed, falling back to reader proxy"
        );

        match self.fetch_text(&reader_url).await {
            Ok(body) => Ok(FetchedPage {
                body,
                source: ExtractionSource::ReaderProxy,
            }),
            Err(proxy_failure) => Err(EngineError::Fetch {
                url: url.to_string(),
                reason: format!("{}; reader proxy: {}", direct_failure, proxy_failure),
            }),
        }
    }

    /// Reader URL for a page: `{base}/https://...` or `{base}/http://...`.
    pub fn reader_url(&self, url: &str) -> String {
        if url.starts_with("https://") {
            format!("{}/{}", self.reader_base, url)
        } else {
            let bare = url
                .trim_start_matches("http://")
                .trim_start_matches("https://");
            format!("{}/http://{}", self.reader_base, bare)
        }
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| describe_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let body = response.text().await.map_err(|e| describe_error(&e))?;
        debug!(url = %url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
