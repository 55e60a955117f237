mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{Instrumented, Reply, analysis, create, harness, sample_brief};
use decision_lens::clients::{Generator, Preference, ProviderKind};
use decision_lens::cognitive::catalog;
use decision_lens::cognitive::types::GenerationMode;
use decision_lens::config::GenerationScope;
use decision_lens::error::AnalysisError;
use decision_lens::runs::{ResultStore, RunStatus};

fn deep_ids() -> Vec<&'static str> {
    catalog::deep_tier().map(|d| d.id).collect()
}

fn non_deep_ids(n: usize) -> Vec<&'static str> {
    catalog::catalog()
        .iter()
        .filter(|d| !d.deep_tier)
        .take(n)
        .map(|d| d.id)
        .collect()
}

#[tokio::test]
async fn in_flight_generation_never_exceeds_worker_limit() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).with_delay(Duration::from_millis(25)));
    let h = harness(
        analysis(GenerationScope::DeepOnly, 3),
        vec![local.clone() as Arc<dyn Generator>],
        Some(sample_brief()),
    )
    .await;
    let ids = deep_ids();
    let run_id = create(&h, &ids, Preference::Local).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    assert_eq!(local.calls(), ids.len());
    assert!(local.peak() >= 1 && local.peak() <= 3, "peak {}", local.peak());
    let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Complete);
    assert_eq!(snapshot.completed_count, ids.len());
    assert_eq!(snapshot.framework_count, ids.len());
    assert_eq!(snapshot.provider.as_deref(), Some("local"));
    assert_eq!(snapshot.model.as_deref(), Some("test-local"));
    assert!(snapshot.started_at.is_some() && snapshot.ended_at.is_some());
}

#[tokio::test]
async fn deep_only_scope_never_calls_generator_for_other_frameworks() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local));
    let h = harness(
        analysis(GenerationScope::DeepOnly, 4),
        vec![local.clone() as Arc<dyn Generator>],
        Some(sample_brief()),
    )
    .await;
    let ids = non_deep_ids(6);
    let run_id = create(&h, &ids, Preference::Auto).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    assert_eq!(local.calls(), 0);
    for r in h.store.list_results(&run_id).await.unwrap() {
        assert_eq!(r.generation.mode, GenerationMode::Fallback);
        assert_eq!(r.visualization.kind(), "theme_radar");
    }
}

#[tokio::test]
async fn invalid_output_for_one_framework_falls_back_without_failing_the_run() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).poisoned_for("SWOT Analysis"));
    let h = harness(
        analysis(GenerationScope::DeepOnly, 3),
        vec![local.clone() as Arc<dyn Generator>],
        Some(sample_brief()),
    )
    .await;
    let run_id = create(&h, &["swot", "pareto", "risk_matrix"], Preference::Local).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    let results = h.store.list_results(&run_id).await.unwrap();
    let swot = results.iter().find(|r| r.framework_id == "swot").unwrap();
    assert_eq!(swot.generation.mode, GenerationMode::Fallback);
    let warning = swot.generation.warning.as_deref().unwrap_or_default();
    assert!(!warning.is_empty());
    assert!(warning.contains("Model output invalid"), "{warning}");
    for r in results.iter().filter(|r| r.framework_id != "swot") {
        assert_eq!(r.generation.mode, GenerationMode::Generated);
    }

    let finalized = h.store.get_finalized(&run_id).await.unwrap();
    assert!(finalized.synthesis.warnings.iter().any(|w| w.starts_with("swot: ")));
    let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Complete);
}

#[tokio::test]
async fn auto_preference_recovers_on_the_alternate_backend() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).with_reply(Reply::Unavailable));
    let hosted = Arc::new(Instrumented::new(ProviderKind::Hosted));
    let h = harness(
        analysis(GenerationScope::DeepOnly, 2),
        vec![
            local.clone() as Arc<dyn Generator>,
            hosted.clone() as Arc<dyn Generator>,
        ],
        Some(sample_brief()),
    )
    .await;
    let run_id = create(&h, &["swot", "eisenhower"], Preference::Auto).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    assert_eq!(local.calls(), 2);
    assert_eq!(hosted.calls(), 2);
    for r in h.store.list_results(&run_id).await.unwrap() {
        assert_eq!(r.generation.mode, GenerationMode::Generated);
        assert_eq!(r.generation.provider, "hosted");
        let warning = r.generation.warning.as_deref().unwrap_or_default();
        assert!(warning.contains("recovered on hosted"), "{warning}");
    }
}

#[tokio::test]
async fn explicit_preference_times_out_into_fallback() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).with_reply(Reply::Hang));
    let hosted = Arc::new(Instrumented::new(ProviderKind::Hosted));
    let mut cfg = analysis(GenerationScope::DeepOnly, 2);
    cfg.generation_timeout_ms = 50;
    let h = harness(
        cfg,
        vec![
            local.clone() as Arc<dyn Generator>,
            hosted.clone() as Arc<dyn Generator>,
        ],
        Some(sample_brief()),
    )
    .await;
    let run_id = create(&h, &["monte_carlo"], Preference::Local).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    assert_eq!(hosted.calls(), 0);
    let r = h.store.list_results(&run_id).await.unwrap().remove(0);
    assert_eq!(r.generation.mode, GenerationMode::Fallback);
    assert!(r.generation.warning.unwrap().contains("timed out after 50ms"));
}

#[tokio::test]
async fn unavailable_preferred_backend_runs_deterministically() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).unhealthy());
    let h = harness(
        analysis(GenerationScope::All, 3),
        vec![local.clone() as Arc<dyn Generator>],
        Some(sample_brief()),
    )
    .await;
    let run_id = create(&h, &["swot", "ooda"], Preference::Hosted).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());

    assert_eq!(local.calls(), 0);
    let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
    assert_eq!(snapshot.provider.as_deref(), Some("deterministic"));
    for r in h.store.list_results(&run_id).await.unwrap() {
        let warning = r.generation.warning.unwrap_or_default();
        assert!(warning.contains("preference 'hosted'"), "{warning}");
    }
}

#[tokio::test]
async fn missing_brief_fails_the_run() {
    let h = harness(analysis(GenerationScope::Simulation, 2), Vec::new(), None).await;
    let run_id = create(&h, &["swot"], Preference::Auto).await;

    let err = h.controller.run_now(&run_id).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MissingBrief { .. }));

    let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Failed);
    assert!(snapshot.status.is_terminal());
    assert!(snapshot.error.unwrap().contains("Missing brief"));
    assert!(snapshot.ended_at.is_some());
}

#[tokio::test]
async fn concurrent_enqueues_execute_the_run_once() {
    let local = Arc::new(Instrumented::new(ProviderKind::Local).with_delay(Duration::from_millis(20)));
    let h = harness(
        analysis(GenerationScope::DeepOnly, 2),
        vec![local.clone() as Arc<dyn Generator>],
        Some(sample_brief()),
    )
    .await;
    let ids = deep_ids();
    let run_id = create(&h, &ids, Preference::Local).await;

    let first = h.controller.enqueue_run(&run_id);
    let second = h.controller.enqueue_run(&run_id);
    let outcomes = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];

    assert_eq!(outcomes.iter().filter(|started| **started).count(), 1);
    assert_eq!(local.calls(), ids.len());
    assert!(h.controller.registry().is_empty());
    let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Complete);
}

#[tokio::test]
async fn completed_run_carries_map_and_synthesis() {
    let h = harness(analysis(GenerationScope::Simulation, 4), Vec::new(), Some(sample_brief())).await;
    let ids: Vec<&str> = deep_ids().into_iter().chain(non_deep_ids(8)).collect();
    let run_id = create(&h, &ids, Preference::Auto).await;

    assert!(h.controller.run_now(&run_id).await.unwrap());
    let finalized = h.store.get_finalized(&run_id).await.unwrap();

    let map = &finalized.map;
    assert_eq!(map.nodes.len(), ids.len());
    assert!(!map.edges.is_empty());
    assert_eq!(finalized.edges, map.edges);
    let mut pairs = HashSet::new();
    for e in &map.edges {
        assert!((0.0..=1.0).contains(&e.weight));
        assert!(e.source < e.target);
        assert!(pairs.insert((e.source.clone(), e.target.clone())));
    }

    let s = &finalized.synthesis;
    assert_eq!(s.top_frameworks.len(), 5);
    for w in s.top_frameworks.windows(2) {
        assert!(w[0].composite_score >= w[1].composite_score);
    }
    // low risk tolerance with a staged and a cautious alternative
    assert_ne!(s.decision.recommended_option, "Full launch");
    let full = s
        .decision
        .option_scores
        .iter()
        .find(|o| o.option == "Full launch")
        .unwrap();
    assert!(full.components.risk_fit < 0.2);
    assert!(s.warnings.is_empty());
}

#[tokio::test]
async fn simulation_runs_are_byte_identical() {
    let ids: Vec<&str> = deep_ids().into_iter().chain(non_deep_ids(10)).collect();
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let h = harness(analysis(GenerationScope::Simulation, 3), Vec::new(), Some(sample_brief())).await;
        let run_id = create(&h, &ids, Preference::Auto).await;
        assert!(h.controller.run_now(&run_id).await.unwrap());
        let results = h.store.list_results(&run_id).await.unwrap();
        let finalized = h.store.get_finalized(&run_id).await.unwrap();
        outputs.push((
            serde_json::to_string(&results).unwrap(),
            serde_json::to_string(&finalized.map).unwrap(),
            serde_json::to_string(&finalized.synthesis).unwrap(),
        ));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn revalidation_repairs_tampered_visualizations_only() {
    let h = harness(analysis(GenerationScope::Simulation, 2), Vec::new(), Some(sample_brief())).await;
    let run_id = create(&h, &["swot", "ooda"], Preference::Auto).await;
    assert!(h.controller.run_now(&run_id).await.unwrap());

    let results = h.store.list_results(&run_id).await.unwrap();
    let ooda = results.iter().find(|r| r.framework_id == "ooda").unwrap().clone();
    let mut swot = results.iter().find(|r| r.framework_id == "swot").unwrap().clone();
    let original = swot.clone();
    swot.visualization = ooda.visualization.clone();
    h.store.upsert_framework_result(&run_id, swot).await.unwrap();

    assert_eq!(h.controller.revalidate_visualizations(&run_id).await.unwrap(), 1);

    let after = h.store.list_results(&run_id).await.unwrap();
    let swot = after.iter().find(|r| r.framework_id == "swot").unwrap();
    assert_eq!(swot.visualization, original.visualization);
    assert_eq!(swot.insights, original.insights);
    assert_eq!(swot.applicability_score, original.applicability_score);
    assert!(swot.generation.warning.as_deref().unwrap().contains("visualization repaired"));
    let ooda_after = after.iter().find(|r| r.framework_id == "ooda").unwrap();
    assert_eq!(ooda_after, &ooda);
}

#[tokio::test]
async fn extreme_budgets_complete_the_run() {
    for budget in ["123456789b".to_string(), "9".repeat(400)] {
        let brief = decision_lens::DecisionBrief {
            budget: Some(budget.clone()),
            ..sample_brief()
        };
        let h = harness(analysis(GenerationScope::Simulation, 2), Vec::new(), Some(brief)).await;
        let run_id = create(&h, &["cost_benefit", "swot"], Preference::Auto).await;

        assert!(h.controller.run_now(&run_id).await.unwrap(), "budget {budget}");
        let snapshot = h.controller.get_run_snapshot(&run_id).await.unwrap();
        assert_eq!(snapshot.status, RunStatus::Complete);
        assert_eq!(snapshot.completed_count, 2);
    }
}
