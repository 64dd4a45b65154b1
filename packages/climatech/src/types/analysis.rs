//! Pipeline results exposed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::Language;
use super::relation::RelationJudgment;
use super::summary::Summary;

/// Fast-path result: no classification, no matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSummary {
    pub title: String,
    pub summary: Summary,
}

/// Full pipeline result for one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub url: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub language: Language,
    pub translated: bool,

    pub summary: Summary,

    pub is_match: bool,
    pub match_rationale: String,

    /// At most three, best first
    pub related_documents: Vec<RelationJudgment>,

    /// Present whenever `related_documents` is empty
    pub no_match_reason: Option<String>,

    /// Coarse topic, only computed for non-climatech articles
    pub main_topic: Option<String>,
}

/// One URL of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Normalised URL
    pub url: String,
    pub analysis: Option<ArticleAnalysis>,

    /// Stage and message of a fatal error
    pub error: Option<String>,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,

    /// Input URLs skipped because they normalised to an earlier one
    pub duplicates: Vec<String>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.analysis.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }
}
