use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::error::AnalysisError;

/// Generation backend identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Local,
    Hosted,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Hosted => "hosted",
        }
    }

    pub fn other(&self) -> ProviderKind {
        match self {
            ProviderKind::Local => ProviderKind::Hosted,
            ProviderKind::Hosted => ProviderKind::Local,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ProviderKind::Local),
            "hosted" => Ok(ProviderKind::Hosted),
            other => Err(format!("unknown provider '{other}' (expected local or hosted)")),
        }
    }
}

/// Caller's stated backend preference for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Local,
    Hosted,
    #[default]
    Auto,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Local => "local",
            Preference::Hosted => "hosted",
            Preference::Auto => "auto",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Preference::Local),
            "hosted" => Ok(Preference::Hosted),
            "auto" | "" => Ok(Preference::Auto),
            other => Err(format!(
                "unknown preference '{other}' (expected local, hosted or auto)"
            )),
        }
    }
}

/// One schema-constrained generation request
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub schema: Arc<Map<String, Value>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("{provider} backend unavailable: {message}")]
    Unavailable { provider: String, message: String },
    #[error("invalid structured output: {0}")]
    InvalidOutput(String),
    #[error("generation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Unavailable, invalid output and timeouts enter the analyzer's failover chain; anything
    /// else propagates.
    pub fn is_failover_eligible(&self) -> bool {
        !matches!(self, GenerationError::Other(_))
    }
}

impl From<GenerationError> for AnalysisError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Unavailable { provider, message } => {
                tracing::debug!(%provider, %message, "backend reported unavailable");
                AnalysisError::ProviderUnavailable {
                    preference: provider.clone(),
                    attempted: vec![provider],
                }
            }
            GenerationError::InvalidOutput(message) => AnalysisError::ModelOutputInvalid { message },
            GenerationError::Timeout { timeout_ms } => AnalysisError::ModelTimeout {
                operation: "structured generation".to_string(),
                timeout_ms,
            },
            GenerationError::Other(message) => AnalysisError::Internal { message },
        }
    }
}

/// A structured-output generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    fn provider(&self) -> ProviderKind;

    fn model_id(&self) -> &str;

    /// Cheap, side-effect-free liveness probe. Never runs a generation.
    async fn is_healthy(&self) -> bool;

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_parses_case_insensitively() {
        assert_eq!("AUTO".parse::<Preference>().unwrap(), Preference::Auto);
        assert_eq!(" hosted ".parse::<Preference>().unwrap(), Preference::Hosted);
        assert!("cloud".parse::<Preference>().is_err());
    }

    #[test]
    fn only_other_errors_skip_failover() {
        assert!(GenerationError::InvalidOutput("x".into()).is_failover_eligible());
        assert!(GenerationError::Timeout { timeout_ms: 5 }.is_failover_eligible());
        assert!(!GenerationError::Other("boom".into()).is_failover_eligible());
    }

    #[test]
    fn generation_errors_map_to_analysis_errors() {
        let err: AnalysisError = GenerationError::Timeout { timeout_ms: 10 }.into();
        assert!(err.is_generation_failure());
        let err: AnalysisError = GenerationError::Other("boom".into()).into();
        assert!(!err.is_generation_failure());
    }
}
