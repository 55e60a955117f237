//! Framework analyzer: turns one framework plus one brief into a `FrameworkResult`.
//!
//! Deep-tier frameworks (or all frameworks under `GenerationScope::All`) go through a
//! generation backend; everything else, and every generation failure the failover chain
//! cannot recover, uses the seeded heuristics. Generation failures never escape this module.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::brief::DecisionBrief;
use crate::clients::{Preference, ProviderResolver, ResolvedProvider, StructuredRequest};
use crate::cognitive::catalog::{self, FrameworkDefinition};
use crate::cognitive::framework::dedup_capped;
use crate::cognitive::heuristics::{deterministic_result, fit_score};
use crate::cognitive::themes::{ThemeVector, clamp_unit, round3};
use crate::cognitive::types::{FrameworkResult, GenerationMeta, GenerationMode};
use crate::config::{AnalysisConfig, GenerationScope};
use crate::deserializers::{de_score_forgiving, de_string_list_forgiving};
use crate::error::{AnalysisError, Result};
use crate::schemas::framework_analysis_schema;
use crate::visuals::ensure_valid;

const MODEL_APPLICABILITY_WEIGHT: f64 = 0.8;
const MODEL_CONFIDENCE_WEIGHT: f64 = 0.85;
const MAX_LIST_ITEMS: usize = 8;

/// Outcome of resolving the run's backend once, before the pool starts
#[derive(Debug, Clone)]
pub enum PrimaryBackend {
    Ready(ResolvedProvider),
    /// Resolution failed; the message is carried into every affected result's warning
    Unavailable(String),
}

/// Everything the analyzer needs to call a generation backend for one run
pub struct GenerationContext {
    pub resolver: Arc<ProviderResolver>,
    pub primary: PrimaryBackend,
    pub preference: Preference,
    pub scope: GenerationScope,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationContext {
    pub fn new(
        resolver: Arc<ProviderResolver>,
        primary: PrimaryBackend,
        preference: Preference,
        analysis: &AnalysisConfig,
    ) -> Self {
        Self {
            resolver,
            primary,
            preference,
            scope: analysis.scope,
            timeout: analysis.generation_timeout(),
            temperature: analysis.temperature,
            max_tokens: analysis.max_tokens,
        }
    }

    pub fn should_generate(&self, def: &FrameworkDefinition) -> bool {
        match self.scope {
            GenerationScope::Simulation => false,
            GenerationScope::DeepOnly => def.deep_tier,
            GenerationScope::All => true,
        }
    }
}

/// Model output after forgiving deserialization
#[derive(Debug, Deserialize)]
struct GeneratedAnalysis {
    #[serde(deserialize_with = "de_score_forgiving")]
    applicability_score: f64,
    #[serde(deserialize_with = "de_score_forgiving")]
    confidence: f64,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    insights: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    actions: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    risks: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    assumptions: Vec<String>,
}

impl GeneratedAnalysis {
    fn from_value(value: serde_json::Value) -> Result<Self> {
        let parsed: GeneratedAnalysis =
            serde_json::from_value(value).map_err(|e| AnalysisError::ModelOutputInvalid {
                message: format!("schema mismatch: {e}"),
            })?;
        if parsed.insights.is_empty() {
            return Err(AnalysisError::ModelOutputInvalid {
                message: "insights must contain at least one entry".to_string(),
            });
        }
        Ok(parsed)
    }
}

fn system_prompt(def: &FrameworkDefinition) -> String {
    format!(
        "You are a rigorous decision analyst applying the {} framework, which examines {}. \
         Score how applicable the framework is to the decision and how confident you are, \
         both in [0,1]. Keep every list item to one short sentence grounded in the brief.",
        def.name, def.focus
    )
}

fn user_prompt(def: &FrameworkDefinition, brief: &DecisionBrief, themes: &ThemeVector) -> String {
    let brief_json = serde_json::to_string_pretty(brief).unwrap_or_else(|_| brief.statement.clone());
    let themes_json = serde_json::to_string(themes).unwrap_or_default();
    format!(
        "Framework: {} ({})\nDecision theme profile: {}\n\nDecision brief:\n{}",
        def.name, def.id, themes_json, brief_json
    )
}

/// Analyze one framework against a brief.
///
/// `generation = None` (or a scope that excludes the framework) yields the seeded
/// deterministic result. Only non-generation errors are returned.
pub async fn analyze(
    framework_id: &str,
    brief: &DecisionBrief,
    decision_themes: &ThemeVector,
    generation: Option<&GenerationContext>,
) -> Result<FrameworkResult> {
    let def = catalog::find(framework_id).ok_or_else(|| AnalysisError::UnknownFramework {
        framework_id: framework_id.to_string(),
    })?;
    let baseline = deterministic_result(def, brief, decision_themes);

    let mut result = match generation.filter(|g| g.should_generate(def)) {
        Some(ctx) => generate_with_failover(def, brief, decision_themes, baseline, ctx).await?,
        None => {
            debug!(framework_id, "deterministic analysis");
            baseline
        }
    };

    let (visualization, repair_warning) = ensure_valid(
        def.id,
        Some(result.visualization.clone()),
        brief,
        &result.themes,
    )?;
    result.visualization = visualization;
    if let Some(w) = repair_warning {
        result.generation.push_warning(w);
    }
    Ok(result)
}

async fn generate_with_failover(
    def: &FrameworkDefinition,
    brief: &DecisionBrief,
    decision_themes: &ThemeVector,
    baseline: FrameworkResult,
    ctx: &GenerationContext,
) -> Result<FrameworkResult> {
    let primary = match &ctx.primary {
        PrimaryBackend::Ready(p) => p,
        PrimaryBackend::Unavailable(reason) => {
            return Ok(fallback(
                baseline,
                format!("deterministic fallback: {reason}"),
            ));
        }
    };

    let first_err = match attempt(ctx, primary, def, brief, decision_themes, &baseline).await {
        Ok(result) => return Ok(result),
        Err(e) if e.is_generation_failure() => e,
        Err(e) => return Err(e),
    };
    warn!(
        framework_id = def.id,
        provider = %primary.provider,
        kind = first_err.kind(),
        error = %first_err,
        "generation failed"
    );

    if ctx.preference != Preference::Auto {
        return Ok(fallback(
            baseline,
            format!(
                "deterministic fallback: {} failed ({}); no failover for preference '{}'",
                primary.provider, first_err, ctx.preference
            ),
        ));
    }

    let Some(alternate) = ctx.resolver.alternate(primary.provider).await else {
        return Ok(fallback(
            baseline,
            format!(
                "deterministic fallback: {} failed ({}); no healthy alternate backend",
                primary.provider, first_err
            ),
        ));
    };

    match attempt(ctx, &alternate, def, brief, decision_themes, &baseline).await {
        Ok(mut result) => {
            warn!(
                framework_id = def.id,
                from = %primary.provider,
                to = %alternate.provider,
                "recovered on alternate backend"
            );
            result.generation.push_warning(format!(
                "recovered on {} after {} failed: {}",
                alternate.provider, primary.provider, first_err
            ));
            Ok(result)
        }
        Err(second_err) if second_err.is_generation_failure() => Ok(fallback(
            baseline,
            format!(
                "deterministic fallback: {} failed ({}); {} failed ({})",
                primary.provider, first_err, alternate.provider, second_err
            ),
        )),
        Err(e) => Err(e),
    }
}

fn fallback(mut baseline: FrameworkResult, warning: String) -> FrameworkResult {
    warn!(framework_id = %baseline.framework_id, %warning, "using deterministic result");
    baseline.generation = GenerationMeta::deterministic(Some(warning));
    baseline
}

/// One generation call with its timeout, merged over the deterministic baseline.
async fn attempt(
    ctx: &GenerationContext,
    backend: &ResolvedProvider,
    def: &FrameworkDefinition,
    brief: &DecisionBrief,
    decision_themes: &ThemeVector,
    baseline: &FrameworkResult,
) -> Result<FrameworkResult> {
    let request = StructuredRequest {
        system_prompt: system_prompt(def),
        user_prompt: user_prompt(def, brief, decision_themes),
        schema: framework_analysis_schema(),
        temperature: ctx.temperature,
        max_tokens: ctx.max_tokens,
    };
    debug!(framework_id = def.id, provider = %backend.provider, "generation request");

    let value = match tokio::time::timeout(ctx.timeout, backend.generator.generate_structured(request)).await {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(AnalysisError::ModelTimeout {
                operation: format!("{} generation for {}", backend.provider, def.id),
                timeout_ms: ctx.timeout.as_millis() as u64,
            });
        }
    };
    let generated = GeneratedAnalysis::from_value(value)?;

    let fit = fit_score(&def.weights, decision_themes);
    let blend = |model: f64, weight: f64| round3(clamp_unit(weight * model + (1.0 - weight) * fit));
    let or_baseline = |items: Vec<String>, base: &[String]| {
        let items = dedup_capped(items, MAX_LIST_ITEMS);
        if items.is_empty() { base.to_vec() } else { items }
    };

    Ok(FrameworkResult {
        framework_id: baseline.framework_id.clone(),
        framework_name: baseline.framework_name.clone(),
        category: baseline.category.clone(),
        applicability_score: blend(generated.applicability_score, MODEL_APPLICABILITY_WEIGHT),
        confidence: blend(generated.confidence, MODEL_CONFIDENCE_WEIGHT),
        insights: dedup_capped(generated.insights, MAX_LIST_ITEMS),
        actions: or_baseline(generated.actions, &baseline.actions),
        risks: or_baseline(generated.risks, &baseline.risks),
        assumptions: or_baseline(generated.assumptions, &baseline.assumptions),
        themes: baseline.themes,
        // canonical payload regardless of what the model described
        visualization: baseline.visualization.clone(),
        generation: GenerationMeta {
            mode: GenerationMode::Generated,
            provider: backend.provider.as_str().to_string(),
            model: backend.model_id.clone(),
            warning: None,
        },
    })
}
