//! Climatech classification.
//!
//! The generative backend answers a SI/NO rubric in free text and the reply
//! is parsed with the rule table in [`verdict`]. Backend failures never
//! propagate: the article is reported as not climatech with the rationale
//! "classification error".

pub mod keywords;
pub mod topic;
pub mod verdict;

pub use keywords::{keyword_hits, keyword_verdict, CLIMATECH_KEYWORDS};
pub use topic::main_topic;
pub use verdict::{parse_verdict, Evaluation, Verdict, VerdictTable};

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::prompts;
use crate::traits::ai::{CompletionRequest, Purpose, AI};
use crate::types::verdict::ClassificationVerdict;

/// Binary climatech classifier backed by an [`AI`].
pub struct ClimatechClassifier<A: AI> {
    ai: Arc<A>,
    table: VerdictTable,
}

impl<A: AI> ClimatechClassifier<A> {
    pub fn new(ai: Arc<A>) -> Self {
        Self {
            ai,
            table: VerdictTable::standard(),
        }
    }

    /// Classify `text`. Never fails.
    pub async fn classify(&self, text: &str) -> ClassificationVerdict {
        match self.try_classify(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "Classification failed");
                ClassificationVerdict::classification_error()
            }
        }
    }

    /// Classify `text`, surfacing backend failures as [`EngineError::Classification`].
    pub async fn try_classify(&self, text: &str) -> Result<ClassificationVerdict> {
        let request = CompletionRequest::new(Purpose::Classify)
            .system(prompts::CLASSIFY_SYSTEM)
            .user(prompts::format_classify_prompt(text));

        let reply = self
            .ai
            .complete(request)
            .await
            .map_err(|e| EngineError::Classification(e.to_string()))?;

        let evaluation = self.table.evaluate(&reply);
        debug!(verdict = ?evaluation.verdict, rule = ?evaluation.rule, "Parsed classifier reply");
        info!(is_match = evaluation.verdict.is_match(), "Article classified");

        Ok(ClassificationVerdict::new(
            evaluation.verdict.is_match(),
            reply.trim(),
        ))
    }

    /// Keyword-only classification, no backend call.
    pub fn classify_offline(&self, text: &str) -> ClassificationVerdict {
        keyword_verdict(text)
    }
}
