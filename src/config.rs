use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::clients::{Preference, ProviderKind};

/// Hard ceiling on concurrent framework workers per run
pub const MAX_CONCURRENCY_CAP: usize = 8;

/// Main configuration structure loaded from decision_lens.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Which frameworks may call a generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationScope {
    /// Only deep-tier frameworks call the generator
    #[default]
    DeepOnly,
    /// Every framework calls the generator
    All,
    /// No generator calls at all; seeded heuristics only
    Simulation,
}

impl GenerationScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationScope::DeepOnly => "deep_only",
            GenerationScope::All => "all",
            GenerationScope::Simulation => "simulation",
        }
    }
}

impl fmt::Display for GenerationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "deep_only" | "deep" => Ok(GenerationScope::DeepOnly),
            "all" => Ok(GenerationScope::All),
            "simulation" | "simulate" => Ok(GenerationScope::Simulation),
            other => Err(format!(
                "unknown scope '{other}' (expected deep_only, all or simulation)"
            )),
        }
    }
}

/// Run pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_concurrency: usize,
    pub generation_timeout_ms: u64,
    pub scope: GenerationScope,
    pub preference: Preference,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            generation_timeout_ms: 45_000,
            scope: GenerationScope::DeepOnly,
            preference: Preference::Auto,
            temperature: 0.2,
            max_tokens: 1200,
        }
    }
}

impl AnalysisConfig {
    /// Worker count clamped to `1..=MAX_CONCURRENCY_CAP`.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.clamp(1, MAX_CONCURRENCY_CAP)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Probe order for `auto` preference
    pub priority: Vec<ProviderKind>,
    pub local: LocalProviderConfig,
    pub hosted: HostedProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            priority: vec![ProviderKind::Local, ProviderKind::Hosted],
            local: LocalProviderConfig::default(),
            hosted: HostedProviderConfig::default(),
        }
    }
}

/// OpenAI-compatible server on the local machine (llama.cpp, vLLM, Ollama)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalProviderConfig {
    pub endpoint: String,
    pub model: String,
    pub health_timeout_ms: u64,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8111/v1".to_string(),
            model: "qwen2.5-7b-instruct".to_string(),
            health_timeout_ms: 1500,
        }
    }
}

/// Hosted OpenAI-compatible API
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostedProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub health_timeout_ms: u64,
}

impl Default for HostedProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            health_timeout_ms: 3000,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub hosted_api_key: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "decision_lens=info".to_string(),
            hosted_api_key: None,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env(api_key_env: &str) -> Self {
        Self {
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "decision_lens=info".to_string()),
            hosted_api_key: std::env::var(api_key_env)
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .filter(|k| !k.trim().is_empty()),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses DECISION_LENS_CONFIG environment variable or defaults to "decision_lens.toml"
    pub fn load() -> anyhow::Result<Self> {
        // DLENS_ENV_FILE if set, else ./.env
        if let Ok(env_path) = std::env::var("DLENS_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("DECISION_LENS_CONFIG")
            .unwrap_or_else(|_| "decision_lens.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            Self::from_toml(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env(&config.providers.hosted.api_key_env);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Env-first overrides for the analysis and provider sections
    pub fn apply_env_overrides(&mut self) {
        if let Some(n) = env_parse::<usize>("DLENS_MAX_CONCURRENCY") {
            self.analysis.max_concurrency = n;
        }
        if let Some(ms) = env_parse::<u64>("DLENS_GENERATION_TIMEOUT_MS") {
            self.analysis.generation_timeout_ms = ms;
        }
        if let Some(scope) = env_parse::<GenerationScope>("DLENS_SCOPE") {
            self.analysis.scope = scope;
        }
        if let Some(pref) = env_parse::<Preference>("DLENS_PREFERENCE") {
            self.analysis.preference = pref;
        }
        if let Ok(endpoint) = std::env::var("DLENS_LOCAL_ENDPOINT") {
            self.providers.local.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("DLENS_LOCAL_MODEL") {
            self.providers.local.model = model;
        }
        if let Ok(base_url) = std::env::var("DLENS_HOSTED_BASE_URL") {
            self.providers.hosted.base_url = base_url;
        }
        if let Ok(model) = std::env::var("DLENS_HOSTED_MODEL") {
            self.providers.hosted.model = model;
        }
    }

    /// Clamp out-of-range values and reject unusable ones.
    pub fn validate(&mut self) -> anyhow::Result<()> {
        let requested = self.analysis.max_concurrency;
        let effective = self.analysis.effective_concurrency();
        if requested != effective {
            tracing::warn!(
                "max_concurrency {} out of range, clamped to {} (cap {})",
                requested,
                effective,
                MAX_CONCURRENCY_CAP
            );
            self.analysis.max_concurrency = effective;
        }
        if self.analysis.generation_timeout_ms == 0 {
            anyhow::bail!("analysis.generation_timeout_ms must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.analysis.temperature) {
            anyhow::bail!(
                "analysis.temperature must be within [0, 2], got {}",
                self.analysis.temperature
            );
        }
        let mut seen = Vec::new();
        self.providers.priority.retain(|p| {
            let fresh = !seen.contains(p);
            seen.push(*p);
            fresh
        });
        if self.providers.priority.is_empty() {
            self.providers.priority = ProvidersConfig::default().priority;
        }
        Ok(())
    }
}
