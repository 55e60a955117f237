//! Persistence seams for runs, results and briefs, plus an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tokio::sync::RwLock;

use crate::brief::DecisionBrief;
use crate::clients::Preference;
use crate::cognitive::types::FrameworkResult;
use crate::error::{AnalysisError, Result};
use crate::propagation::{MapEdge, PropagatedMap};
use crate::synthesis::SynthesisSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Analyzing,
    Synthesizing,
    Complete,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Analyzing => "analyzing",
            RunStatus::Synthesizing => "synthesizing",
            RunStatus::Complete => "complete",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of a framework set against one decision brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: String,
    pub decision_id: String,
    pub framework_ids: Vec<String>,
    pub preference: Preference,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl AnalysisRun {
    pub fn queued(decision_id: &str, framework_ids: Vec<String>, preference: Preference) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            decision_id: decision_id.to_string(),
            framework_ids,
            preference,
            provider: None,
            model: None,
            status: RunStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            error: None,
        }
    }
}

/// Partial update applied by `update_run_status`; `None` fields are left untouched.
#[derive(Debug, Clone)]
pub struct RunStatusUpdate {
    pub status: RunStatus,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunStatusUpdate {
    pub fn status(status: RunStatus) -> Self {
        Self {
            status,
            provider: None,
            model: None,
            error: None,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn analyzing(provider: Option<String>, model: Option<String>) -> Self {
        Self {
            provider,
            model,
            started_at: Some(Utc::now()),
            ..Self::status(RunStatus::Analyzing)
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ended_at: Some(Utc::now()),
            ..Self::status(RunStatus::Failed)
        }
    }
}

/// Everything written atomically when a run completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedRun {
    pub edges: Vec<MapEdge>,
    pub map: PropagatedMap,
    pub synthesis: SynthesisSummary,
    pub ended_at: DateTime<Utc>,
}

/// Poll-friendly view of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: String,
    pub status: RunStatus,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub error: Option<String>,
    pub framework_count: usize,
    pub completed_count: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl RunSnapshot {
    pub fn from_run(run: &AnalysisRun, completed_count: usize) -> Self {
        Self {
            run_id: run.id.clone(),
            status: run.status,
            provider: run.provider.clone(),
            model: run.model.clone(),
            error: run.error.clone(),
            framework_count: run.framework_ids.len(),
            completed_count,
            created_at: run.created_at,
            started_at: run.started_at,
            ended_at: run.ended_at,
        }
    }
}

#[async_trait]
pub trait BriefStore: Send + Sync {
    /// The brief the run analyzes; `MissingBrief` when absent.
    async fn get_brief_for_run(&self, run_id: &str) -> Result<DecisionBrief>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn get_run(&self, run_id: &str) -> Result<AnalysisRun>;
    async fn insert_run(&self, run: AnalysisRun) -> Result<()>;
    /// Insert or replace the result for `(run_id, result.framework_id)`.
    async fn upsert_framework_result(&self, run_id: &str, result: FrameworkResult) -> Result<()>;
    async fn update_run_status(&self, run_id: &str, update: RunStatusUpdate) -> Result<()>;
    /// Results ordered by framework id
    async fn list_results(&self, run_id: &str) -> Result<Vec<FrameworkResult>>;
    async fn count_results(&self, run_id: &str) -> Result<usize>;
    /// Write edges, map and synthesis and mark the run complete in one step.
    async fn finalize_run(&self, run_id: &str, finalized: FinalizedRun) -> Result<()>;
}

#[derive(Default)]
struct StoreState {
    briefs: HashMap<String, DecisionBrief>,
    runs: HashMap<String, AnalysisRun>,
    results: HashMap<String, BTreeMap<String, FrameworkResult>>,
    finalized: HashMap<String, FinalizedRun>,
}

/// Process-local store backing the CLI and tests.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a brief under its `decision_id`, replacing any earlier one.
    pub async fn insert_brief(&self, brief: DecisionBrief) {
        let mut state = self.state.write().await;
        state.briefs.insert(brief.decision_id.clone(), brief);
    }

    pub async fn get_finalized(&self, run_id: &str) -> Option<FinalizedRun> {
        self.state.read().await.finalized.get(run_id).cloned()
    }
}

fn run_not_found(run_id: &str) -> AnalysisError {
    AnalysisError::RunNotFound {
        run_id: run_id.to_string(),
    }
}

#[async_trait]
impl BriefStore for InMemoryStore {
    async fn get_brief_for_run(&self, run_id: &str) -> Result<DecisionBrief> {
        let state = self.state.read().await;
        let run = state.runs.get(run_id).ok_or_else(|| run_not_found(run_id))?;
        state
            .briefs
            .get(&run.decision_id)
            .cloned()
            .ok_or_else(|| AnalysisError::MissingBrief {
                run_id: run_id.to_string(),
            })
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn get_run(&self, run_id: &str) -> Result<AnalysisRun> {
        self.state
            .read()
            .await
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| run_not_found(run_id))
    }

    async fn insert_run(&self, run: AnalysisRun) -> Result<()> {
        let mut state = self.state.write().await;
        if state.runs.contains_key(&run.id) {
            return Err(AnalysisError::Store {
                message: format!("run {} already exists", run.id),
            });
        }
        state.runs.insert(run.id.clone(), run);
        Ok(())
    }

    async fn upsert_framework_result(&self, run_id: &str, result: FrameworkResult) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.runs.contains_key(run_id) {
            return Err(run_not_found(run_id));
        }
        state
            .results
            .entry(run_id.to_string())
            .or_default()
            .insert(result.framework_id.clone(), result);
        Ok(())
    }

    async fn update_run_status(&self, run_id: &str, update: RunStatusUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        let run = state.runs.get_mut(run_id).ok_or_else(|| run_not_found(run_id))?;
        run.status = update.status;
        if update.provider.is_some() {
            run.provider = update.provider;
        }
        if update.model.is_some() {
            run.model = update.model;
        }
        if update.error.is_some() {
            run.error = update.error;
        }
        if update.started_at.is_some() {
            run.started_at = update.started_at;
        }
        if update.ended_at.is_some() {
            run.ended_at = update.ended_at;
        }
        Ok(())
    }

    async fn list_results(&self, run_id: &str) -> Result<Vec<FrameworkResult>> {
        let state = self.state.read().await;
        if !state.runs.contains_key(run_id) {
            return Err(run_not_found(run_id));
        }
        Ok(state
            .results
            .get(run_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_results(&self, run_id: &str) -> Result<usize> {
        let state = self.state.read().await;
        if !state.runs.contains_key(run_id) {
            return Err(run_not_found(run_id));
        }
        Ok(state.results.get(run_id).map_or(0, BTreeMap::len))
    }

    async fn finalize_run(&self, run_id: &str, finalized: FinalizedRun) -> Result<()> {
        let mut state = self.state.write().await;
        let run = state.runs.get_mut(run_id).ok_or_else(|| run_not_found(run_id))?;
        run.status = RunStatus::Complete;
        run.ended_at = Some(finalized.ended_at);
        run.error = None;
        state.finalized.insert(run_id.to_string(), finalized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_brief_is_reported_per_run() {
        let store = InMemoryStore::new();
        let run = AnalysisRun::queued("d-404", vec!["swot".into()], Preference::Auto);
        let run_id = run.id.clone();
        store.insert_run(run).await.unwrap();
        let err = store.get_brief_for_run(&run_id).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingBrief { .. }));
        let err = store.get_brief_for_run("nope").await.unwrap_err();
        assert!(matches!(err, AnalysisError::RunNotFound { .. }));
    }

    #[tokio::test]
    async fn status_updates_only_touch_given_fields() {
        let store = InMemoryStore::new();
        let run = AnalysisRun::queued("d", vec![], Preference::Local);
        let run_id = run.id.clone();
        store.insert_run(run).await.unwrap();

        store
            .update_run_status(&run_id, RunStatusUpdate::analyzing(Some("local".into()), Some("m".into())))
            .await
            .unwrap();
        store
            .update_run_status(&run_id, RunStatusUpdate::status(RunStatus::Synthesizing))
            .await
            .unwrap();
        let run = store.get_run(&run_id).await.unwrap();
        assert_eq!(run.status, RunStatus::Synthesizing);
        assert_eq!(run.provider.as_deref(), Some("local"));
        assert!(run.started_at.is_some());
        assert!(!run.status.is_terminal());
    }

    #[tokio::test]
    async fn duplicate_run_insert_is_rejected() {
        let store = InMemoryStore::new();
        let run = AnalysisRun::queued("d", vec![], Preference::Auto);
        store.insert_run(run.clone()).await.unwrap();
        assert!(matches!(
            store.insert_run(run).await,
            Err(AnalysisError::Store { .. })
        ));
    }
}
