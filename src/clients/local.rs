use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::chat::ChatEndpoint;
use super::traits::{GenerationError, Generator, ProviderKind, StructuredRequest};
use crate::config::LocalProviderConfig;

/// OpenAI-compatible server running next to the process (llama.cpp, vLLM, Ollama)
#[derive(Clone, Debug)]
pub struct LocalGenerator {
    endpoint: ChatEndpoint,
}

impl LocalGenerator {
    pub fn new(cfg: &LocalProviderConfig, request_timeout: Duration) -> Self {
        // Accept a bare host:port as well as a /v1 base
        let base = if cfg.endpoint.trim_end_matches('/').ends_with("/v1")
            || cfg.endpoint.contains("/v1/")
        {
            cfg.endpoint.clone()
        } else {
            format!("{}/v1", cfg.endpoint.trim_end_matches('/'))
        };
        Self {
            endpoint: ChatEndpoint::new(
                ProviderKind::Local,
                &base,
                &cfg.model,
                None,
                request_timeout,
                Duration::from_millis(cfg.health_timeout_ms),
            ),
        }
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }
}

#[async_trait]
impl Generator for LocalGenerator {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn model_id(&self) -> &str {
        self.endpoint.model()
    }

    async fn is_healthy(&self) -> bool {
        self.endpoint.probe().await
    }

    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, GenerationError> {
        self.endpoint.complete_json(request).await
    }
}
