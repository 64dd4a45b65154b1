//! Reference documents from the newsletter backend.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::traits::corpus::ReferenceStore;
use crate::types::relation::ReferenceDocument;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Reads every newsletter from `{base_url}/api/Newsletter`.
pub struct HttpReferenceStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReferenceStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| EngineError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/Newsletter?limit=10000&page=1", self.base_url)
    }
}

#[async_trait]
impl ReferenceStore for HttpReferenceStore {
    async fn reference_documents(&self) -> Result<Vec<ReferenceDocument>> {
        let url = self.endpoint();
        info!(url = %url, "Fetching reference documents");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| EngineError::Store(Box::new(e)))?
            .error_for_status()
            .map_err(|e| EngineError::Store(Box::new(e)))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::Store(Box::new(e)))?;

        let Value::Array(items) = body else {
            warn!("Newsletter endpoint did not return an array");
            return Ok(Vec::new());
        };

        let total = items.len();
        let documents: Vec<ReferenceDocument> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed newsletter");
                    None
                }
            })
            .collect();

        info!(documents = documents.len(), skipped = total - documents.len(), "Reference documents loaded");
        Ok(documents)
    }
}
