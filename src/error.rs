//! Domain-specific error types for decision-lens

use thiserror::Error;

/// Main error type for the analysis core
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Provider unavailable: no healthy backend for preference '{preference}' (attempted: {})", attempted.join(", "))]
    ProviderUnavailable {
        preference: String,
        attempted: Vec<String>,
    },

    #[error("Model output invalid: {message}")]
    ModelOutputInvalid { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    ModelTimeout { operation: String, timeout_ms: u64 },

    #[error("Missing brief: run {run_id} has no associated decision brief")]
    MissingBrief { run_id: String },

    #[error("Incomplete run: run {run_id} finished without results for {}", missing.join(", "))]
    IncompleteRun { run_id: String, missing: Vec<String> },

    #[error("Visualization contract violation for {framework_id}: {}", issues.join("; "))]
    VisualizationContractViolation {
        framework_id: String,
        issues: Vec<String>,
    },

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Unknown framework: {framework_id}")]
    UnknownFramework { framework_id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// True for the generation failures the analyzer absorbs through its failover chain.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::ProviderUnavailable { .. }
                | AnalysisError::ModelOutputInvalid { .. }
                | AnalysisError::ModelTimeout { .. }
        )
    }

    /// Short label used in warnings and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ProviderUnavailable { .. } => "provider_unavailable",
            AnalysisError::ModelOutputInvalid { .. } => "model_output_invalid",
            AnalysisError::ModelTimeout { .. } => "model_timeout",
            AnalysisError::MissingBrief { .. } => "missing_brief",
            AnalysisError::IncompleteRun { .. } => "incomplete_run",
            AnalysisError::VisualizationContractViolation { .. } => "visualization_contract_violation",
            AnalysisError::RunNotFound { .. } => "run_not_found",
            AnalysisError::UnknownFramework { .. } => "unknown_framework",
            AnalysisError::Config { .. } => "config",
            AnalysisError::Store { .. } => "store",
            AnalysisError::Serialization { .. } => "serialization",
            AnalysisError::Internal { .. } => "internal",
        }
    }
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_unavailable_names_preference_and_backends() {
        let err = AnalysisError::ProviderUnavailable {
            preference: "auto".into(),
            attempted: vec!["local:llama3.1".into(), "hosted:gpt-4o-mini".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("auto"));
        assert!(msg.contains("local:llama3.1"));
        assert!(msg.contains("hosted:gpt-4o-mini"));
        assert!(err.is_generation_failure());
    }

    #[test]
    fn fatal_kinds_are_not_generation_failures() {
        let missing = AnalysisError::MissingBrief {
            run_id: "r1".into(),
        };
        let incomplete = AnalysisError::IncompleteRun {
            run_id: "r1".into(),
            missing: vec!["swot".into()],
        };
        assert!(!missing.is_generation_failure());
        assert!(!incomplete.is_generation_failure());
        assert!(incomplete.to_string().contains("swot"));
    }
}
