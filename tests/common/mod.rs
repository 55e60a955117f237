//! Shared fixtures: instrumented generators and a seeded store.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use decision_lens::brief::{DecisionBrief, RiskTolerance};
use decision_lens::clients::{
    GenerationError, Generator, Preference, ProviderKind, ProviderResolver, StructuredRequest,
};
use decision_lens::config::{AnalysisConfig, GenerationScope};
use decision_lens::runs::{InMemoryStore, RunController};

/// How an instrumented generator answers a request
#[derive(Clone)]
pub enum Reply {
    Valid,
    Invalid,
    Unavailable,
    Hang,
}

/// Generator that records calls and peak concurrency
pub struct Instrumented {
    kind: ProviderKind,
    healthy: AtomicBool,
    delay: Duration,
    default_reply: Reply,
    /// Framework names (as they appear in the prompt) that get `Reply::Invalid`
    poison: HashSet<String>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl Instrumented {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            healthy: AtomicBool::new(true),
            delay: Duration::from_millis(0),
            default_reply: Reply::Valid,
            poison: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_reply(mut self, reply: Reply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn poisoned_for(mut self, framework_name: &str) -> Self {
        self.poison.insert(framework_name.to_string());
        self
    }

    pub fn unhealthy(self) -> Self {
        self.healthy.store(false, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// User prompts seen so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Generator for Instrumented {
    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn model_id(&self) -> &str {
        match self.kind {
            ProviderKind::Local => "test-local",
            ProviderKind::Hosted => "test-hosted",
        }
    }

    async fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    async fn generate_structured(&self, request: StructuredRequest) -> Result<Value, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(request.user_prompt.clone());
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let poisoned = self
            .poison
            .iter()
            .any(|name| request.user_prompt.contains(&format!("Framework: {name} (")));
        let reply = if poisoned { Reply::Invalid } else { self.default_reply.clone() };
        match reply {
            Reply::Valid => Ok(json!({
                "applicability_score": 0.74,
                "confidence": 0.66,
                "insights": ["The decision hinges on execution capacity"],
                "actions": ["Run a two-week spike"],
                "risks": ["Key engineer leaves mid-rollout"],
                "assumptions": ["Demand holds through Q4"]
            })),
            Reply::Invalid => Ok(json!({"applicability_score": "extremely", "insights": []})),
            Reply::Unavailable => Err(GenerationError::Unavailable {
                provider: self.kind.as_str().to_string(),
                message: "connection refused".into(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GenerationError::Other("unreachable".into()))
            }
        }
    }
}

pub fn sample_brief() -> DecisionBrief {
    DecisionBrief {
        decision_id: "launch-2026".into(),
        title: "Launch the analytics add-on".into(),
        statement: "Should we launch the analytics add-on to all customers this quarter or stage it?"
            .into(),
        context: "Competitors shipped similar features; support capacity is limited.".into(),
        alternatives: vec!["Full launch".into(), "Phased pilot".into(), "Delay".into()],
        stakeholders: vec!["Sales".into(), "Support".into(), "Finance".into()],
        criteria: vec!["Net revenue retention".into(), "Support ticket volume".into()],
        constraints: vec!["Support headcount is frozen".into()],
        assumptions: vec!["Pricing stays unchanged".into()],
        deadline: Some("2026-12-15".into()),
        budget: Some("$250k".into()),
        risk_tolerance: RiskTolerance::Low,
    }
}

pub fn analysis(scope: GenerationScope, max_concurrency: usize) -> AnalysisConfig {
    AnalysisConfig {
        scope,
        max_concurrency,
        generation_timeout_ms: 2_000,
        ..Default::default()
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub controller: RunController,
}

pub async fn harness(
    analysis: AnalysisConfig,
    backends: Vec<Arc<dyn Generator>>,
    brief: Option<DecisionBrief>,
) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    if let Some(b) = brief {
        store.insert_brief(b).await;
    }
    let controller = RunController::new(
        analysis,
        Arc::new(ProviderResolver::new(backends)),
        store.clone(),
        store.clone(),
    );
    Harness { store, controller }
}

pub async fn create(h: &Harness, frameworks: &[&str], preference: Preference) -> String {
    h.controller
        .create_run(
            "launch-2026",
            frameworks.iter().map(|s| s.to_string()).collect(),
            preference,
        )
        .await
        .expect("create run")
        .id
}
