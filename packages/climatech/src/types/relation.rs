//! Reference documents and relation judgments.

use serde::{Deserialize, Deserializer, Serialize};

/// A curated newsletter the engine matches articles against.
///
/// Accepts the backend's field names (`titulo`, `Resumen`) and numeric ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(alias = "titulo", default)]
    pub title: String,

    #[serde(alias = "Resumen", alias = "resumen", default)]
    pub body_text: String,

    #[serde(default)]
    pub link: Option<String>,
}

impl ReferenceDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body_text: body_text.into(),
            link: None,
        }
    }

    /// Title and body as one text, the unit used for matching and embedding.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body_text).trim().to_string()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

/// Lexical pre-filter score for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateScore {
    pub document_id: String,
    pub token_overlap: usize,
    pub keyword_cooccurrence: usize,
}

impl CandidateScore {
    /// Ranking key: co-occurrence dominates, overlap breaks ties.
    pub fn rank(&self) -> usize {
        self.keyword_cooccurrence * 100 + self.token_overlap
    }
}

/// Outcome of the pairwise judgment for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationJudgment {
    pub document_id: String,
    pub document_title: String,
    pub link: Option<String>,

    pub related: bool,

    /// Specificity after the negative-example penalty, 0-100
    pub score: u8,

    /// Penalty subtracted from the model score
    pub penalty: u8,

    /// Shown to users; the enriched narrative when available
    pub rationale: String,

    /// What the pairwise judgment originally said
    pub initial_rationale: String,

    pub rejected_as_generic: bool,
}

impl RelationJudgment {
    /// Whether the judgment may appear in the final result set.
    pub fn is_accepted(&self, accept_score: u8) -> bool {
        self.related && !self.rejected_as_generic && self.score >= accept_score
    }
}

/// Result of matching one summary against the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Accepted judgments, best first
    pub judgments: Vec<RelationJudgment>,

    /// Set whenever `judgments` is empty
    pub no_match_reason: Option<String>,
}

impl MatchOutcome {
    pub fn no_match(reason: impl Into<String>) -> Self {
        Self {
            judgments: Vec::new(),
            no_match_reason: Some(reason.into()),
        }
    }

    pub fn is_match(&self) -> bool {
        !self.judgments.is_empty()
    }
}
