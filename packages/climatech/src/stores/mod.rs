//! Reference and feedback store implementations.
//!
//! - `MemoryReferenceStore` / `MemoryFeedbackStore`: in-memory, optionally
//!   loaded from JSON files
//! - `HttpReferenceStore`: the newsletter backend's REST API

pub mod http;
pub mod memory;

pub use http::HttpReferenceStore;
pub use memory::{FeedbackFile, MemoryFeedbackStore, MemoryReferenceStore};
