//! Run lifecycle: `queued → analyzing → synthesizing → complete`, or `failed`.
//!
//! A run resolves its generation backend once, fans its framework ids out to a bounded
//! pool of workers that claim indices from a shared counter, persists each result as soon
//! as it exists, then builds the propagation map and synthesis and finalizes atomically.

use chrono::Utc;
use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::registry::RunRegistry;
use super::store::{
    AnalysisRun, BriefStore, FinalizedRun, ResultStore, RunSnapshot, RunStatus, RunStatusUpdate,
};
use crate::analyzer::{GenerationContext, PrimaryBackend, analyze};
use crate::brief::DecisionBrief;
use crate::clients::{Preference, ProviderResolver};
use crate::cognitive::catalog;
use crate::cognitive::themes::{ThemeVector, infer_theme_vector};
use crate::cognitive::types::GenerationMeta;
use crate::config::{AnalysisConfig, GenerationScope};
use crate::error::{AnalysisError, Result};
use crate::propagation::build_propagated_map;
use crate::synthesis::{OptionPolicy, build_synthesis_summary_with};
use crate::visuals::ensure_valid;

#[derive(Clone)]
pub struct RunController {
    analysis: AnalysisConfig,
    resolver: Arc<ProviderResolver>,
    briefs: Arc<dyn BriefStore>,
    results: Arc<dyn ResultStore>,
    registry: RunRegistry,
    policy: Arc<OptionPolicy>,
}

impl RunController {
    pub fn new(
        analysis: AnalysisConfig,
        resolver: Arc<ProviderResolver>,
        briefs: Arc<dyn BriefStore>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            analysis,
            resolver,
            briefs,
            results,
            registry: RunRegistry::new(),
            policy: Arc::new(OptionPolicy::default()),
        }
    }

    /// Replace the option keyword policy used by synthesis.
    pub fn with_policy(mut self, policy: OptionPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    /// Validate framework ids and insert a queued run. An empty list selects the whole catalog.
    pub async fn create_run(
        &self,
        decision_id: &str,
        framework_ids: Vec<String>,
        preference: Preference,
    ) -> Result<AnalysisRun> {
        let requested = if framework_ids.is_empty() {
            catalog::all_ids()
        } else {
            framework_ids
        };
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(requested.len());
        for id in requested {
            let id = id.trim().to_string();
            if catalog::find(&id).is_none() {
                return Err(AnalysisError::UnknownFramework { framework_id: id });
            }
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }

        let run = AnalysisRun::queued(decision_id, ids, preference);
        self.results.insert_run(run.clone()).await?;
        info!(run_id = %run.id, decision_id, frameworks = run.framework_ids.len(), "run queued");
        Ok(run)
    }

    /// Start the run on a background task. Enqueueing a run that is already executing is a no-op.
    pub fn enqueue_run(&self, run_id: &str) -> JoinHandle<Result<bool>> {
        let controller = self.clone();
        let run_id = run_id.to_string();
        tokio::spawn(async move { controller.run_now(&run_id).await })
    }

    /// Execute the run to a terminal state.
    ///
    /// Returns `Ok(false)` without doing anything when the run is already executing or
    /// already terminal. Any pipeline error marks the run failed and is returned.
    pub async fn run_now(&self, run_id: &str) -> Result<bool> {
        let Some(_guard) = self.registry.try_begin_exclusive(run_id) else {
            debug!(run_id, "run already in flight");
            return Ok(false);
        };

        let run = self.results.get_run(run_id).await?;
        if run.status.is_terminal() {
            debug!(run_id, status = %run.status, "run already finished");
            return Ok(false);
        }

        match self.execute(&run).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(run_id, kind = e.kind(), error = %e, "run failed");
                if let Err(store_err) = self
                    .results
                    .update_run_status(run_id, RunStatusUpdate::failed(e.to_string()))
                    .await
                {
                    error!(run_id, error = %store_err, "could not record run failure");
                }
                Err(e)
            }
        }
    }

    pub async fn get_run_snapshot(&self, run_id: &str) -> Result<RunSnapshot> {
        let run = self.results.get_run(run_id).await?;
        let completed = self.results.count_results(run_id).await?;
        Ok(RunSnapshot::from_run(&run, completed))
    }

    /// Re-check every stored visualization, replacing failures canonically.
    ///
    /// Only the visualization and the generation warning of a repaired result change.
    /// Returns the number of results repaired.
    pub async fn revalidate_visualizations(&self, run_id: &str) -> Result<usize> {
        let brief = self.briefs.get_brief_for_run(run_id).await?;
        let mut repaired = 0;
        for mut result in self.results.list_results(run_id).await? {
            let (payload, warning) = ensure_valid(
                &result.framework_id,
                Some(result.visualization.clone()),
                &brief,
                &result.themes,
            )?;
            let Some(warning) = warning else { continue };
            warn!(run_id, framework_id = %result.framework_id, %warning, "stored visualization repaired");
            result.visualization = payload;
            result.generation.push_warning(warning);
            self.results.upsert_framework_result(run_id, result).await?;
            repaired += 1;
        }
        info!(run_id, repaired, "visualization revalidation finished");
        Ok(repaired)
    }

    async fn generation_context(&self, preference: Preference) -> Option<GenerationContext> {
        if self.analysis.scope == GenerationScope::Simulation {
            return None;
        }
        let primary = match self.resolver.resolve(preference).await {
            Ok(resolved) => PrimaryBackend::Ready(resolved),
            Err(e) => {
                warn!(preference = %preference, error = %e, "no generation backend for run");
                PrimaryBackend::Unavailable(e.to_string())
            }
        };
        Some(GenerationContext::new(
            Arc::clone(&self.resolver),
            primary,
            preference,
            &self.analysis,
        ))
    }

    async fn execute(&self, run: &AnalysisRun) -> Result<()> {
        let brief = self.briefs.get_brief_for_run(&run.id).await?;
        let decision_themes = infer_theme_vector(&brief);
        let generation = self.generation_context(run.preference).await;

        let (provider, model) = match generation.as_ref().map(|g| &g.primary) {
            Some(PrimaryBackend::Ready(p)) => (p.provider.as_str().to_string(), p.model_id.clone()),
            _ => {
                let meta = GenerationMeta::deterministic(None);
                (meta.provider, meta.model)
            }
        };
        self.results
            .update_run_status(
                &run.id,
                RunStatusUpdate::analyzing(Some(provider.clone()), Some(model.clone())),
            )
            .await?;
        info!(run_id = %run.id, %provider, %model, frameworks = run.framework_ids.len(), "run analyzing");

        self.run_pool(run, &brief, &decision_themes, generation.as_ref())
            .await?;

        let results = self.results.list_results(&run.id).await?;
        let present: HashSet<&str> = results.iter().map(|r| r.framework_id.as_str()).collect();
        let missing: Vec<String> = run
            .framework_ids
            .iter()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AnalysisError::IncompleteRun {
                run_id: run.id.clone(),
                missing,
            });
        }

        self.results
            .update_run_status(&run.id, RunStatusUpdate::status(RunStatus::Synthesizing))
            .await?;
        info!(run_id = %run.id, results = results.len(), "run synthesizing");

        let map = build_propagated_map(&results);
        let synthesis = build_synthesis_summary_with(&brief, &results, &map, &self.policy);
        let finalized = FinalizedRun {
            edges: map.edges.clone(),
            map,
            synthesis,
            ended_at: Utc::now(),
        };
        let recommended = finalized.synthesis.decision.recommended_option.clone();
        let edges = finalized.edges.len();
        self.results.finalize_run(&run.id, finalized).await?;
        info!(run_id = %run.id, edges, %recommended, "run complete");
        Ok(())
    }

    async fn run_pool(
        &self,
        run: &AnalysisRun,
        brief: &DecisionBrief,
        decision_themes: &ThemeVector,
        generation: Option<&GenerationContext>,
    ) -> Result<()> {
        let ids = &run.framework_ids;
        let workers = self
            .analysis
            .effective_concurrency()
            .min(ids.len())
            .max(1);
        let next = AtomicUsize::new(0);

        let handled = try_join_all((0..workers).map(|worker| {
            self.worker(worker, &next, &run.id, ids, brief, decision_themes, generation)
        }))
        .await?;
        debug!(run_id = %run.id, workers, per_worker = ?handled, "pool drained");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn worker(
        &self,
        worker: usize,
        next: &AtomicUsize,
        run_id: &str,
        ids: &[String],
        brief: &DecisionBrief,
        decision_themes: &ThemeVector,
        generation: Option<&GenerationContext>,
    ) -> Result<usize> {
        let mut handled = 0;
        loop {
            let index = next.fetch_add(1, Ordering::Relaxed);
            let Some(framework_id) = ids.get(index) else {
                break;
            };
            let result = analyze(framework_id, brief, decision_themes, generation).await?;
            debug!(
                run_id,
                worker,
                framework_id = %framework_id,
                mode = ?result.generation.mode,
                applicability = result.applicability_score,
                "framework analyzed"
            );
            self.results.upsert_framework_result(run_id, result).await?;
            handled += 1;
        }
        Ok(handled)
    }
}
