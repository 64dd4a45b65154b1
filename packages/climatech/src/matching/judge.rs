//! Stage 3: pairwise relation judgment.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EngineError;
use crate::text::normalize;

/// Structured reply requested from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationPayload {
    /// "SI" or "NO"
    #[serde(rename = "relacionado")]
    pub related: String,

    /// Detailed justification naming the shared entities
    #[serde(rename = "razon")]
    pub rationale: String,

    /// Specificity, 0 to 100
    #[serde(deserialize_with = "number_or_numeric_string")]
    #[schemars(with = "f64")]
    pub score: f64,
}

/// Accepts `85`, `85.0` or `"85"`.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    match Score::deserialize(deserializer)? {
        Score::Number(n) => Ok(n),
        Score::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("score is not a number: {text:?}"))),
    }
}

impl RelationPayload {
    pub fn is_related(&self) -> bool {
        normalize(self.related.trim()) == "si"
    }

    /// Model score clamped to 0..=100, minus `penalty`, floored at zero.
    pub fn penalized_score(&self, penalty: u8) -> u8 {
        let score = if self.score.is_finite() {
            self.score.clamp(0.0, 100.0).round() as u8
        } else {
            0
        };
        score.saturating_sub(penalty)
    }
}

/// Outcome of parsing the model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedJudgment {
    Parsed(RelationPayload),
    Malformed { raw: String },
}

impl ParsedJudgment {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<RelationPayload>(strip_fences(raw)) {
            Ok(payload) => ParsedJudgment::Parsed(payload),
            Err(_) => ParsedJudgment::Malformed {
                raw: raw.to_string(),
            },
        }
    }

    /// The payload, or the matching [`EngineError::ScoringParse`].
    pub fn into_result(self) -> Result<RelationPayload, EngineError> {
        match self {
            ParsedJudgment::Parsed(payload) => Ok(payload),
            ParsedJudgment::Malformed { raw } => Err(EngineError::ScoringParse { raw }),
        }
    }
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
