//! Run-level synthesis: ranking, contradictions, actions, checkpoints and the option recommendation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::brief::{DecisionBrief, RiskTolerance};
use crate::cognitive::themes::{ThemeAxis, ThemeVector, clamp_unit, round3};
use crate::cognitive::types::FrameworkResult;
use crate::propagation::{MapEdge, PropagatedMap};

pub const TOP_FRAMEWORKS: usize = 5;
pub const MAX_CONTRADICTIONS: usize = 6;
pub const MAX_ACTIONS: usize = 10;
pub const MAX_CHECKPOINTS: usize = 5;
/// Score gap between the top two options at which the gap term saturates
const DECISIVE_GAP: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFramework {
    pub framework_id: String,
    pub name: String,
    pub composite_score: f64,
    pub applicability_score: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub risk_fit: f64,
    pub opportunity_fit: f64,
    pub resource_fit: f64,
    pub stakeholder_fit: f64,
    pub optionality: f64,
    pub uncertainty_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionScore {
    pub option: String,
    pub score: f64,
    pub aggressiveness: f64,
    pub components: ScoreComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecommendation {
    pub recommended_option: String,
    pub confidence: f64,
    pub rationale: String,
    pub tradeoffs: Vec<String>,
    pub next_actions: Vec<String>,
    pub option_scores: Vec<OptionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSummary {
    pub top_frameworks: Vec<RankedFramework>,
    pub contradictions: Vec<MapEdge>,
    pub recommended_actions: Vec<String>,
    pub checkpoints: Vec<String>,
    pub warnings: Vec<String>,
    pub decision: DecisionRecommendation,
}

/// Keyword policy mapping option text to aggressiveness and optionality.
///
/// Medium keywords are checked first so "phased full launch" reads as staged.
#[derive(Debug, Clone)]
pub struct OptionPolicy {
    pub medium_keywords: Vec<&'static str>,
    pub low_keywords: Vec<&'static str>,
    pub high_keywords: Vec<&'static str>,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub neutral: f64,
}

impl Default for OptionPolicy {
    fn default() -> Self {
        Self {
            medium_keywords: vec!["pilot", "phase", "trial", "test", "incremental", "staged"],
            low_keywords: vec![
                "conservative", "safe", "delay", "wait", "defer", "hold", "maintain",
            ],
            high_keywords: vec![
                "full", "aggressive", "commit", "all-in", "launch", "scale", "expand",
            ],
            low: 0.2,
            medium: 0.5,
            high: 0.85,
            neutral: 0.5,
        }
    }
}

impl OptionPolicy {
    pub fn aggressiveness(&self, option: &str) -> f64 {
        let text = option.to_lowercase();
        let hit = |words: &[&str]| words.iter().any(|w| text.contains(w));
        if hit(&self.medium_keywords) {
            self.medium
        } else if hit(&self.low_keywords) {
            self.low
        } else if hit(&self.high_keywords) {
            self.high
        } else {
            self.neutral
        }
    }

    /// How reversible the option is: cautious and staged options keep doors open.
    pub fn optionality(&self, aggressiveness: f64) -> f64 {
        if aggressiveness <= self.medium {
            0.8
        } else if aggressiveness >= self.high {
            0.25
        } else {
            0.5
        }
    }
}

fn risk_fit(tolerance: RiskTolerance, aggressiveness: f64) -> f64 {
    match tolerance {
        RiskTolerance::Low => 1.0 - aggressiveness,
        RiskTolerance::High => aggressiveness,
        RiskTolerance::Medium => 1.0 - (aggressiveness - 0.5).abs() / 0.5,
    }
}

pub fn score_option(
    policy: &OptionPolicy,
    option: &str,
    tolerance: RiskTolerance,
    avg: &ThemeVector,
) -> OptionScore {
    let a = policy.aggressiveness(option);
    let components = ScoreComponents {
        risk_fit: round3(clamp_unit(risk_fit(tolerance, a))),
        opportunity_fit: round3(clamp_unit(avg.opportunity * a)),
        resource_fit: round3(clamp_unit(1.0 - a * avg.resources)),
        stakeholder_fit: round3(clamp_unit(1.0 - a * avg.stakeholder_impact)),
        optionality: policy.optionality(a),
        uncertainty_penalty: round3(clamp_unit(avg.uncertainty * a)),
    };
    let score = 0.30 * components.risk_fit
        + 0.25 * components.opportunity_fit
        + 0.15 * components.resource_fit
        + 0.15 * components.stakeholder_fit
        + 0.15 * components.optionality
        - 0.20 * components.uncertainty_penalty;
    OptionScore {
        option: option.to_string(),
        score: round3(score),
        aggressiveness: a,
        components,
    }
}

/// Axis that most drives uncertainty across the results: the strongest non-opportunity axis
/// of the mean theme vector.
fn dominant_uncertainty_axis(avg: &ThemeVector) -> ThemeAxis {
    let mut best = ThemeAxis::Uncertainty;
    let mut best_value = avg.uncertainty;
    for (axis, value) in avg.axes() {
        if axis != ThemeAxis::Opportunity && value > best_value {
            best = axis;
            best_value = value;
        }
    }
    best
}

fn rank_results(results: &[FrameworkResult]) -> Vec<&FrameworkResult> {
    let mut ranked: Vec<&FrameworkResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.composite_score()
            .total_cmp(&a.composite_score())
            .then_with(|| a.framework_id.cmp(&b.framework_id))
    });
    ranked
}

fn dedup_case_insensitive<'a>(items: impl IntoIterator<Item = &'a String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(cap)
        .map(str::to_string)
        .collect()
}

fn checkpoints(brief: &DecisionBrief, top: &[&FrameworkResult]) -> Vec<String> {
    let mut out = Vec::new();
    for c in brief.criteria.iter().filter(|c| !c.trim().is_empty()) {
        out.push(format!("Measure progress against \"{}\"", c.trim()));
    }
    if let Some(deadline) = brief.deadline.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push(format!("Go/no-go review ahead of the {} deadline", deadline.trim()));
    }
    for r in top.iter().filter_map(|r| r.risks.first()) {
        out.push(format!("Confirm mitigation is in place: {r}"));
    }
    dedup_case_insensitive(out.iter(), MAX_CHECKPOINTS)
}

pub fn recommend(
    brief: &DecisionBrief,
    results: &[FrameworkResult],
    top: &[&FrameworkResult],
    policy: &OptionPolicy,
) -> DecisionRecommendation {
    let themes: Vec<ThemeVector> = results.iter().map(|r| r.themes).collect();
    let avg = ThemeVector::mean(&themes);
    let avg_confidence = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
    };

    let mut option_scores: Vec<OptionScore> = brief
        .candidate_options()
        .iter()
        .map(|o| score_option(policy, o, brief.risk_tolerance, &avg))
        .collect();
    // stable sort keeps brief order among ties
    option_scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    // candidate_options never yields fewer than two options
    let best = &option_scores[0];
    let runner_up = option_scores.get(1);
    let gap = runner_up.map_or(best.score, |r| best.score - r.score).max(0.0);
    let confidence = round3(clamp_unit(
        0.7 * avg_confidence + 0.3 * (gap / DECISIVE_GAP).min(1.0),
    ));
    let axis = dominant_uncertainty_axis(&avg);

    let (rationale, tradeoffs) = match runner_up {
        Some(second) => (
            format!(
                "\"{}\" scores {:.3} against \"{}\" at {:.3} under {} risk tolerance; {} is the dominant source of uncertainty ({:.2}).",
                best.option, best.score, second.option, second.score, brief.risk_tolerance, axis, avg.get(axis)
            ),
            vec![
                format!(
                    "Choosing \"{}\" over \"{}\" trades {:.2} opportunity fit for {:.2} optionality.",
                    best.option,
                    second.option,
                    best.components.opportunity_fit - second.components.opportunity_fit,
                    best.components.optionality - second.components.optionality
                ),
                format!(
                    "If {} resolves favourably, revisit \"{}\".",
                    axis, second.option
                ),
            ],
        ),
        None => (
            format!(
                "\"{}\" is the only option; {} is the dominant source of uncertainty.",
                best.option, axis
            ),
            Vec::new(),
        ),
    };

    let mut next_actions = vec![format!("Commit an owner and first milestone for \"{}\"", best.option)];
    next_actions.extend(top.iter().flat_map(|r| r.actions.iter().take(1)).cloned());
    next_actions.push(format!("Track {} signals weekly until the decision is reviewed", axis));

    DecisionRecommendation {
        recommended_option: best.option.clone(),
        confidence,
        rationale,
        tradeoffs,
        next_actions: dedup_case_insensitive(next_actions.iter(), 5),
        option_scores,
    }
}

/// Summarize a completed run with the default option policy.
pub fn build_synthesis_summary(
    brief: &DecisionBrief,
    results: &[FrameworkResult],
    map: &PropagatedMap,
) -> SynthesisSummary {
    build_synthesis_summary_with(brief, results, map, &OptionPolicy::default())
}

pub fn build_synthesis_summary_with(
    brief: &DecisionBrief,
    results: &[FrameworkResult],
    map: &PropagatedMap,
    policy: &OptionPolicy,
) -> SynthesisSummary {
    let ranked = rank_results(results);
    let top: Vec<&FrameworkResult> = ranked.iter().take(TOP_FRAMEWORKS).copied().collect();

    let top_frameworks = top
        .iter()
        .map(|r| RankedFramework {
            framework_id: r.framework_id.clone(),
            name: r.framework_name.clone(),
            composite_score: round3(r.composite_score()),
            applicability_score: r.applicability_score,
            confidence: r.confidence,
        })
        .collect();

    let contradictions = map
        .conflicts
        .iter()
        .take(MAX_CONTRADICTIONS)
        .cloned()
        .collect();

    let recommended_actions =
        dedup_case_insensitive(top.iter().flat_map(|r| r.actions.iter()), MAX_ACTIONS);

    let mut warnings: Vec<String> = ranked
        .iter()
        .filter_map(|r| {
            r.generation
                .warning
                .as_ref()
                .map(|w| format!("{}: {}", r.framework_id, w))
        })
        .collect();
    warnings.sort();

    SynthesisSummary {
        top_frameworks,
        contradictions,
        recommended_actions,
        checkpoints: checkpoints(brief, &top),
        warnings,
        decision: recommend(brief, results, &top, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::{catalog, deterministic_result, infer_theme_vector};
    use crate::propagation::build_propagated_map;

    fn brief(alternatives: &[&str], tolerance: RiskTolerance) -> DecisionBrief {
        DecisionBrief {
            decision_id: "d".into(),
            title: "Launch the new product line".into(),
            statement: "Do we launch in Q3 or stage it?".into(),
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
            criteria: vec!["Revenue".into(), "Churn".into()],
            deadline: Some("2026-09-30".into()),
            risk_tolerance: tolerance,
            ..Default::default()
        }
    }

    fn results(b: &DecisionBrief) -> Vec<FrameworkResult> {
        let themes = infer_theme_vector(b);
        catalog().iter().map(|d| deterministic_result(d, b, &themes)).collect()
    }

    #[test]
    fn aggressiveness_checks_staged_words_first() {
        let p = OptionPolicy::default();
        assert_eq!(p.aggressiveness("Full launch"), 0.85);
        assert_eq!(p.aggressiveness("Phased pilot"), 0.5);
        assert_eq!(p.aggressiveness("Delay"), 0.2);
        assert_eq!(p.aggressiveness("Phased full launch"), 0.5);
        assert_eq!(p.aggressiveness("Something else"), 0.5);
    }

    #[test]
    fn low_tolerance_does_not_pick_full_launch() {
        let b = brief(&["Full launch", "Phased pilot", "Delay"], RiskTolerance::Low);
        let rs = results(&b);
        let map = build_propagated_map(&rs);
        let s = build_synthesis_summary(&b, &rs, &map);
        assert_ne!(s.decision.recommended_option, "Full launch");
        let scores = &s.decision.option_scores;
        assert_eq!(scores.len(), 3);
        for w in scores.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
        let runner_up = &scores[1].option;
        assert!(s.decision.rationale.contains(runner_up.as_str()));
        assert!(s.decision.tradeoffs.iter().any(|t| t.contains(runner_up.as_str())));
    }

    #[test]
    fn archetypes_stand_in_for_missing_alternatives() {
        let b = brief(&["Only one"], RiskTolerance::Medium);
        let rs = results(&b);
        let s = build_synthesis_summary(&b, &rs, &build_propagated_map(&rs));
        let options: Vec<&str> = s.decision.option_scores.iter().map(|o| o.option.as_str()).collect();
        assert_eq!(options.len(), 3);
        assert!(options.contains(&"Phased rollout"));
    }

    #[test]
    fn top_frameworks_are_non_increasing_and_capped() {
        let b = brief(&[], RiskTolerance::High);
        let rs = results(&b);
        let s = build_synthesis_summary(&b, &rs, &build_propagated_map(&rs));
        assert_eq!(s.top_frameworks.len(), TOP_FRAMEWORKS);
        for w in s.top_frameworks.windows(2) {
            assert!(w[0].composite_score >= w[1].composite_score);
        }
        assert!(s.recommended_actions.len() <= MAX_ACTIONS);
        assert!(!s.checkpoints.is_empty() && s.checkpoints.len() <= MAX_CHECKPOINTS);
        assert!(s.contradictions.len() <= MAX_CONTRADICTIONS);
        assert!((0.0..=1.0).contains(&s.decision.confidence));
    }

    #[test]
    fn warnings_are_prefixed_by_framework() {
        let b = brief(&[], RiskTolerance::Medium);
        let mut rs = results(&b);
        rs[0].generation.push_warning("local timed out");
        let id = rs[0].framework_id.clone();
        let s = build_synthesis_summary(&b, &rs, &build_propagated_map(&rs));
        assert_eq!(s.warnings, vec![format!("{id}: local timed out")]);
    }
}
