//! Healthy-backend selection per caller preference.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::hosted::HostedGenerator;
use super::local::LocalGenerator;
use super::traits::{Generator, Preference, ProviderKind};
use crate::config::Config;
use crate::error::{AnalysisError, Result};

/// A backend that passed its health check
#[derive(Clone)]
pub struct ResolvedProvider {
    pub provider: ProviderKind,
    pub model_id: String,
    pub generator: Arc<dyn Generator>,
}

impl ResolvedProvider {
    fn from_generator(generator: &Arc<dyn Generator>) -> Self {
        Self {
            provider: generator.provider(),
            model_id: generator.model_id().to_string(),
            generator: Arc::clone(generator),
        }
    }
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .finish()
    }
}

pub struct ProviderResolver {
    /// Backends in `auto` probe order
    backends: Vec<Arc<dyn Generator>>,
}

impl ProviderResolver {
    /// Backends are probed in the given order for `auto`; later duplicates of a kind are ignored.
    pub fn new(backends: Vec<Arc<dyn Generator>>) -> Self {
        let mut unique: Vec<Arc<dyn Generator>> = Vec::new();
        for b in backends {
            if !unique.iter().any(|u| u.provider() == b.provider()) {
                unique.push(b);
            }
        }
        Self { backends: unique }
    }

    pub fn from_config(config: &Config) -> Self {
        let timeout = config.analysis.generation_timeout();
        let backends = config
            .providers
            .priority
            .iter()
            .map(|kind| -> Arc<dyn Generator> {
                match kind {
                    ProviderKind::Local => {
                        Arc::new(LocalGenerator::new(&config.providers.local, timeout))
                    }
                    ProviderKind::Hosted => Arc::new(HostedGenerator::new(
                        &config.providers.hosted,
                        config.runtime.hosted_api_key.clone(),
                        timeout,
                    )),
                }
            })
            .collect();
        Self::new(backends)
    }

    fn backend(&self, kind: ProviderKind) -> Option<&Arc<dyn Generator>> {
        self.backends.iter().find(|b| b.provider() == kind)
    }

    async fn healthy(&self, kind: ProviderKind) -> Option<ResolvedProvider> {
        let backend = self.backend(kind)?;
        if backend.is_healthy().await {
            Some(ResolvedProvider::from_generator(backend))
        } else {
            debug!(provider = %kind, "backend failed health check");
            None
        }
    }

    /// Pick a healthy backend for the preference.
    pub async fn resolve(&self, preference: Preference) -> Result<ResolvedProvider> {
        let candidates: Vec<ProviderKind> = match preference {
            Preference::Local => vec![ProviderKind::Local],
            Preference::Hosted => vec![ProviderKind::Hosted],
            Preference::Auto => {
                let mut order: Vec<ProviderKind> =
                    self.backends.iter().map(|b| b.provider()).collect();
                for kind in [ProviderKind::Local, ProviderKind::Hosted] {
                    if !order.contains(&kind) {
                        order.push(kind);
                    }
                }
                order
            }
        };

        let mut attempted = Vec::new();
        for kind in candidates {
            attempted.push(kind.as_str().to_string());
            if let Some(resolved) = self.healthy(kind).await {
                info!(
                    preference = %preference,
                    provider = %resolved.provider,
                    model = %resolved.model_id,
                    "resolved generation backend"
                );
                return Ok(resolved);
            }
        }

        warn!(preference = %preference, attempted = ?attempted, "no healthy generation backend");
        Err(AnalysisError::ProviderUnavailable {
            preference: preference.as_str().to_string(),
            attempted,
        })
    }

    /// The other backend, if configured and currently healthy.
    pub async fn alternate(&self, current: ProviderKind) -> Option<ResolvedProvider> {
        self.healthy(current.other()).await
    }
}
