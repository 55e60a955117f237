//! Types for per-framework analysis results.

use serde::{Deserialize, Serialize};

use super::themes::ThemeVector;
use crate::visuals::VisualizationPayload;

/// How a framework result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMeta {
    pub mode: GenerationMode,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl GenerationMeta {
    pub fn deterministic(warning: Option<String>) -> Self {
        Self {
            mode: GenerationMode::Fallback,
            provider: "deterministic".to_string(),
            model: "seeded-heuristics-v1".to_string(),
            warning,
        }
    }

    /// Append to the warning, keeping any earlier text.
    pub fn push_warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.warning = Some(match self.warning.take() {
            Some(existing) => format!("{existing}; {text}"),
            None => text,
        });
    }
}

/// One framework's evaluation of one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkResult {
    pub framework_id: String,
    pub framework_name: String,
    pub category: String,
    pub applicability_score: f64,
    pub confidence: f64,
    pub insights: Vec<String>,
    pub actions: Vec<String>,
    pub risks: Vec<String>,
    pub assumptions: Vec<String>,
    pub themes: ThemeVector,
    pub visualization: VisualizationPayload,
    pub generation: GenerationMeta,
}

impl FrameworkResult {
    /// `0.6 × applicability + 0.4 × confidence`
    pub fn composite_score(&self) -> f64 {
        0.6 * self.applicability_score + 0.4 * self.confidence
    }
}
