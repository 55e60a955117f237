//! Shared OpenAI-compatible chat-completions plumbing for the local and hosted backends.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::traits::{GenerationError, ProviderKind, StructuredRequest};

#[derive(Clone, Debug)]
pub(crate) struct ChatEndpoint {
    provider: ProviderKind,
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
    health_client: Client,
    timeout_ms: u64,
}

impl ChatEndpoint {
    pub(crate) fn new(
        provider: ProviderKind,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        request_timeout: Duration,
        health_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        let health_client = Client::builder()
            .timeout(health_timeout)
            .build()
            .unwrap_or_default();
        Self {
            provider,
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
            api_key,
            client,
            health_client,
            timeout_ms: request_timeout.as_millis() as u64,
        }
    }

    pub(crate) fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unavailable(&self, message: impl Into<String>) -> GenerationError {
        GenerationError::Unavailable {
            provider: self.provider.as_str().to_string(),
            message: message.into(),
        }
    }

    /// `GET {base}/models` with the short health timeout.
    pub(crate) async fn probe(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let mut req = self.health_client.get(&url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        match req.send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                debug!(provider = %self.provider, status = %resp.status(), "health probe");
                ok
            }
            Err(e) => {
                debug!(provider = %self.provider, error = %e, "health probe failed");
                false
            }
        }
    }

    pub(crate) async fn complete_json(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, GenerationError> {
        let schema = serde_json::to_string(request.schema.as_ref())
            .map_err(|e| GenerationError::Other(format!("serialize schema: {e}")))?;
        let system = format!(
            "{}\n\nRespond with a single JSON object that matches this JSON schema:\n{}",
            request.system_prompt, schema
        );
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": request.user_prompt}
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "response_format": {"type": "json_object"}
        });

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                self.unavailable(format!("send to {url}: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_status(self.provider, status, text));
        }

        let v: Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::InvalidOutput(format!("parse response json: {e}")))?;
        let text = v["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::InvalidOutput("response has no message content".into()))?;
        parse_json_object(text)
    }
}

/// Every status a backend can answer with while another backend could still serve the
/// request is `Unavailable`. That includes 400/413/422, which local servers return when they
/// reject `response_format` or the prompt size.
fn classify_status(provider: ProviderKind, status: StatusCode, text: String) -> GenerationError {
    let message = format!("{status}: {}", text.chars().take(300).collect::<String>());
    if status.is_server_error()
        || matches!(
            status,
            StatusCode::BAD_REQUEST
                | StatusCode::PAYLOAD_TOO_LARGE
                | StatusCode::UNPROCESSABLE_ENTITY
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND
        )
    {
        GenerationError::Unavailable {
            provider: provider.as_str().to_string(),
            message,
        }
    } else {
        GenerationError::Other(message)
    }
}

/// Base URL without trailing slash or a pasted `/chat/completions` suffix.
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim()
        .trim_end_matches('/')
        .trim_end_matches("/chat/completions")
        .trim_end_matches('/')
        .to_string()
}

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("valid fence regex"));

/// Parse a JSON object from model text, tolerating code fences and surrounding prose.
pub(crate) fn parse_json_object(text: &str) -> Result<Value, GenerationError> {
    let unfenced = FENCE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    let parsed = serde_json::from_str::<Value>(unfenced).or_else(|first_err| {
        // fall back to the outermost braces
        match (unfenced.find('{'), unfenced.rfind('}')) {
            (Some(start), Some(end)) if end > start => {
                serde_json::from_str::<Value>(&unfenced[start..=end])
            }
            _ => Err(first_err),
        }
    });

    match parsed {
        Ok(v) if v.is_object() => Ok(v),
        Ok(_) => Err(GenerationError::InvalidOutput(
            "model output is not a JSON object".into(),
        )),
        Err(e) => Err(GenerationError::InvalidOutput(format!("parse provider JSON: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences_and_prose() {
        let v = parse_json_object("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v["a"], 1);
        let v = parse_json_object("Sure! Here it is: {\"a\": 2} hope that helps").unwrap();
        assert_eq!(v["a"], 2);
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            parse_json_object("[1,2,3]"),
            Err(GenerationError::InvalidOutput(_))
        ));
        assert!(matches!(
            parse_json_object("not json"),
            Err(GenerationError::InvalidOutput(_))
        ));
    }

    #[test]
    fn base_url_normalization() {
        assert_eq!(
            normalize_base_url("http://localhost:8111/v1/chat/completions"),
            "http://localhost:8111/v1"
        );
        assert_eq!(normalize_base_url("https://x.test/v1/ "), "https://x.test/v1");
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(ProviderKind::Hosted, StatusCode::SERVICE_UNAVAILABLE, String::new()),
            GenerationError::Unavailable { .. }
        ));
        for rejected in [StatusCode::BAD_REQUEST, StatusCode::UNPROCESSABLE_ENTITY] {
            let err = classify_status(ProviderKind::Local, rejected, "response_format unsupported".into());
            assert!(matches!(err, GenerationError::Unavailable { .. }), "{rejected}");
            assert!(err.is_failover_eligible());
        }
        assert!(matches!(
            classify_status(ProviderKind::Hosted, StatusCode::METHOD_NOT_ALLOWED, String::new()),
            GenerationError::Other(_)
        ));
    }
}
