//! Stage 2: embedding penalty against known false positives.
//!
//! Best-effort throughout. Any embedding failure leaves the penalty at zero.

use tracing::{debug, warn};

use crate::cache::{cosine_similarity, EmbeddingCache};
use crate::config::PenaltyTier;
use crate::traits::ai::AI;
use crate::traits::feedback::NegativeExample;

/// Penalty for a similarity: the largest tier whose threshold is exceeded.
pub fn penalty_for(similarity: f32, tiers: &[PenaltyTier]) -> u8 {
    tiers
        .iter()
        .filter(|tier| similarity > tier.above)
        .map(|tier| tier.penalty)
        .max()
        .unwrap_or(0)
}

/// Embedded negative examples for one matching run.
#[derive(Debug, Default)]
pub struct NegativeSignal {
    vectors: Vec<Vec<f32>>,
}

impl NegativeSignal {
    /// Embed the summary and the negative examples through the cache.
    ///
    /// The summary is embedded first so it is cached for later runs. Stops
    /// at the first failure, keeping whatever was embedded before it.
    pub async fn load<A: AI + ?Sized>(
        ai: &A,
        cache: &EmbeddingCache,
        summary: &str,
        examples: &[NegativeExample],
    ) -> Self {
        if examples.is_empty() {
            return Self::default();
        }

        if let Err(e) = cache.get_or_embed(ai, summary).await {
            warn!(error = %e, "Embeddings unavailable, skipping negative penalty");
            return Self::default();
        }

        let mut vectors = Vec::with_capacity(examples.len());
        for example in examples {
            match cache.get_or_embed(ai, &example.text).await {
                Ok(vector) => vectors.push(vector),
                Err(e) => {
                    warn!(error = %e, embedded = vectors.len(), "Stopped embedding negative examples");
                    break;
                }
            }
        }
        debug!(negatives = vectors.len(), "Negative examples embedded");
        Self { vectors }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Highest cosine similarity between `vector` and any negative example.
    pub fn max_similarity(&self, vector: &[f32]) -> f32 {
        self.vectors
            .iter()
            .map(|negative| cosine_similarity(vector, negative))
            .fold(0.0, f32::max)
    }

    /// Penalty for a document text, zero when it cannot be embedded.
    pub async fn penalty<A: AI + ?Sized>(
        &self,
        ai: &A,
        cache: &EmbeddingCache,
        text: &str,
        tiers: &[PenaltyTier],
    ) -> u8 {
        if self.is_empty() {
            return 0;
        }
        match cache.get_or_embed(ai, text).await {
            Ok(vector) => {
                let similarity = self.max_similarity(&vector);
                let penalty = penalty_for(similarity, tiers);
                debug!(similarity, penalty, "Negative similarity");
                penalty
            }
            Err(e) => {
                warn!(error = %e, "Could not embed candidate, no penalty applied");
                0
            }
        }
    }
}
