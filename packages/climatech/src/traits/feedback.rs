//! Feedback trait: what users previously rejected.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Text of a relation that was confirmed to be wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativeExample {
    pub text: String,
}

impl NegativeExample {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Aggregate count of a rejection reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionReason {
    pub reason: String,
    pub count: u32,
}

/// Read-only source of negative feedback.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    /// Most recent negative examples, at most `limit`.
    async fn negative_examples(&self, limit: usize) -> Result<Vec<NegativeExample>>;

    /// Rejection reasons ordered by descending count, at most `limit`.
    async fn rejection_reasons(&self, limit: usize) -> Result<Vec<RejectionReason>>;
}
