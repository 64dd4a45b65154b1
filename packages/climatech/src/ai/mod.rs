//! AI implementations for the engine.
//!
//! This module provides the production implementation of the `AI` trait.
//! Tests use [`crate::testing::MockAI`] instead.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAI;
