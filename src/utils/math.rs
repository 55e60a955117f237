//! Mathematical utility functions

use crate::cognitive::themes::{ThemeVector, clamp_unit};

/// Calculate cosine similarity between two vectors
/// Returns 0.0 if dimensions don't match or either vector has zero magnitude
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        tracing::warn!(
            "cosine_similarity dimension mismatch: a={}, b={}",
            a.len(),
            b.len()
        );
        return 0.0;
    }
    if a.is_empty() {
        return 0.0;
    }
    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot_product / (norm_a * norm_b)
}

/// Cosine similarity of two theme vectors, clamped to [0,1].
///
/// Theme axes are non-negative so the raw value already lies in [0,1]; the clamp absorbs
/// floating-point overshoot.
pub fn theme_similarity(a: &ThemeVector, b: &ThemeVector) -> f64 {
    clamp_unit(cosine_similarity(&a.to_array(), &b.to_array()))
}
