//! Utility functions shared across the codebase

pub mod math;

pub use math::{cosine_similarity, theme_similarity};
