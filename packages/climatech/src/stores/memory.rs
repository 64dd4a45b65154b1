//! In-memory stores for tests, the CLI and offline runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

use crate::error::{EngineError, Result};
use crate::traits::corpus::ReferenceStore;
use crate::traits::feedback::{FeedbackSource, NegativeExample, RejectionReason};
use crate::types::relation::ReferenceDocument;

/// Fixed list of reference documents.
#[derive(Default)]
pub struct MemoryReferenceStore {
    documents: RwLock<Vec<ReferenceDocument>>,
}

impl MemoryReferenceStore {
    pub fn new(documents: Vec<ReferenceDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a JSON array of documents.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = read_file(path.as_ref())?;
        Ok(Self::new(serde_json::from_str(&raw)?))
    }

    pub fn push(&self, document: ReferenceDocument) {
        self.documents.write().unwrap().push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn reference_documents(&self) -> Result<Vec<ReferenceDocument>> {
        Ok(self.documents.read().unwrap().clone())
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| EngineError::Store(Box::new(e)))
}

/// On-disk shape of a feedback snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackFile {
    #[serde(default)]
    pub negative_examples: Vec<NegativeExample>,

    #[serde(default)]
    pub rejection_reasons: Vec<RejectionReason>,
}

/// Negative examples (newest first) and aggregate rejection reasons.
#[derive(Default)]
pub struct MemoryFeedbackStore {
    negatives: RwLock<Vec<NegativeExample>>,
    reasons: RwLock<Vec<RejectionReason>>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = read_file(path.as_ref())?;
        let file: FeedbackFile = serde_json::from_str(&raw)?;
        Ok(Self {
            negatives: RwLock::new(file.negative_examples),
            reasons: RwLock::new(file.rejection_reasons),
        })
    }

    /// Record a rejected relation text as the newest negative example.
    pub fn with_negative(self, text: impl Into<String>) -> Self {
        self.negatives
            .write()
            .unwrap()
            .insert(0, NegativeExample::new(text));
        self
    }

    /// Add `count` occurrences of `reason`.
    pub fn with_reason(self, reason: impl Into<String>, count: u32) -> Self {
        self.record_reason(reason, count);
        self
    }

    pub fn record_reason(&self, reason: impl Into<String>, count: u32) {
        let reason = reason.into();
        let mut reasons = self.reasons.write().unwrap();
        match reasons.iter_mut().find(|r| r.reason == reason) {
            Some(existing) => existing.count += count,
            None => reasons.push(RejectionReason { reason, count }),
        }
    }
}

#[async_trait]
impl FeedbackSource for MemoryFeedbackStore {
    async fn negative_examples(&self, limit: usize) -> Result<Vec<NegativeExample>> {
        Ok(self
            .negatives
            .read()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn rejection_reasons(&self, limit: usize) -> Result<Vec<RejectionReason>> {
        let mut reasons = self.reasons.read().unwrap().clone();
        reasons.sort_by(|a, b| b.count.cmp(&a.count));
        reasons.truncate(limit);
        Ok(reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reasons_ordered_by_count() {
        let store = MemoryFeedbackStore::new()
            .with_reason("otro sector", 2)
            .with_reason("relación genérica", 5)
            .with_reason("otro sector", 4);

        let reasons = store.rejection_reasons(10).await.unwrap();
        assert_eq!(reasons[0].reason, "otro sector");
        assert_eq!(reasons[0].count, 6);
        assert_eq!(store.rejection_reasons(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_newest_negative_first() {
        let store = MemoryFeedbackStore::new()
            .with_negative("primero")
            .with_negative("segundo");
        let examples = store.negative_examples(1).await.unwrap();
        assert_eq!(examples, vec![NegativeExample::new("segundo")]);
    }

    #[tokio::test]
    async fn test_reference_store_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 7, "titulo": "Litio", "Resumen": "Salares del norte", "link": "https://n.example/7"}}]"#
        )
        .unwrap();

        let store = MemoryReferenceStore::from_json_file(file.path()).unwrap();
        let documents = store.reference_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "7");
        assert_eq!(documents[0].link.as_deref(), Some("https://n.example/7"));
    }
}
