//! Reference corpus trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::relation::ReferenceDocument;

/// Read-only source of reference documents (newsletters).
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// All reference documents currently available.
    async fn reference_documents(&self) -> Result<Vec<ReferenceDocument>>;
}
