use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::chat::ChatEndpoint;
use super::traits::{GenerationError, Generator, ProviderKind, StructuredRequest};
use crate::config::HostedProviderConfig;

/// Hosted OpenAI-compatible API (Groq, OpenAI, OpenRouter)
#[derive(Clone, Debug)]
pub struct HostedGenerator {
    endpoint: ChatEndpoint,
    has_key: bool,
}

impl HostedGenerator {
    pub fn new(cfg: &HostedProviderConfig, api_key: Option<String>, request_timeout: Duration) -> Self {
        let has_key = api_key.is_some();
        Self {
            endpoint: ChatEndpoint::new(
                ProviderKind::Hosted,
                &cfg.base_url,
                &cfg.model,
                api_key,
                request_timeout,
                Duration::from_millis(cfg.health_timeout_ms),
            ),
            has_key,
        }
    }
}

#[async_trait]
impl Generator for HostedGenerator {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Hosted
    }

    fn model_id(&self) -> &str {
        self.endpoint.model()
    }

    async fn is_healthy(&self) -> bool {
        // No key means every call would be rejected; skip the network probe
        if !self.has_key {
            tracing::debug!("hosted backend has no API key configured");
            return false;
        }
        self.endpoint.probe().await
    }

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, GenerationError> {
        if !self.has_key {
            return Err(GenerationError::Unavailable {
                provider: ProviderKind::Hosted.as_str().to_string(),
                message: "API key not set".to_string(),
            });
        }
        self.endpoint.complete_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::framework_analysis_schema;

    #[tokio::test]
    async fn missing_key_is_unhealthy_and_unavailable() {
        let g = HostedGenerator::new(&HostedProviderConfig::default(), None, Duration::from_secs(1));
        assert!(!g.is_healthy().await);
        let err = g
            .generate_structured(StructuredRequest {
                system_prompt: "s".into(),
                user_prompt: "u".into(),
                schema: framework_analysis_schema(),
                temperature: 0.2,
                max_tokens: 100,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable { .. }));
    }
}
