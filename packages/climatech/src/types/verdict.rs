//! Classification result.

use serde::{Deserialize, Serialize};

/// Whether an article is climatech, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub is_match: bool,
    pub rationale: String,
}

impl ClassificationVerdict {
    pub fn new(is_match: bool, rationale: impl Into<String>) -> Self {
        Self {
            is_match,
            rationale: rationale.into(),
        }
    }

    /// Verdict reported when the generative backend could not be reached.
    pub fn classification_error() -> Self {
        Self::new(false, "classification error")
    }
}
