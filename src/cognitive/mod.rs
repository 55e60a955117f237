//! Cognitive module: theme vectors, the framework catalog, and the seeded heuristics
//! that evaluate a brief without any generation backend.
//! Deterministic and free of I/O.

pub mod catalog;
pub mod framework;
pub mod heuristics;
pub mod seed;
pub mod themes;
pub mod types;

pub use catalog::{FrameworkDefinition, catalog, find};
pub use heuristics::{deterministic_result, fit_score};
pub use themes::{ThemeAxis, ThemeVector, infer_theme_vector};
pub use types::{FrameworkResult, GenerationMeta, GenerationMode};
