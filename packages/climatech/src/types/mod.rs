//! Domain data types.

pub mod analysis;
pub mod article;
pub mod relation;
pub mod summary;
pub mod verdict;
