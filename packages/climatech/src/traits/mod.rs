//! Core trait abstractions.
//!
//! - [`ai::AI`] - text generation and embeddings
//! - [`corpus::ReferenceStore`] - the newsletter corpus
//! - [`feedback::FeedbackSource`] - history of rejected relations

pub mod ai;
pub mod corpus;
pub mod feedback;
