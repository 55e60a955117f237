//! Seeded deterministic analysis.
//!
//! Produces a complete `FrameworkResult` without any generation backend. All numeric jitter
//! comes from `seed::unit`/`seed::range` keyed on `(framework_id, title, statement)`, so the
//! same brief always yields the same result.

use super::catalog::FrameworkDefinition;
use super::framework::{clip, dedup_capped, split_sentences, top_keywords};
use super::seed;
use super::themes::{ThemeAxis, ThemeVector, clamp_unit, round3};
use super::types::{FrameworkResult, GenerationMeta};
use crate::brief::DecisionBrief;
use crate::visuals::build_canonical;

/// Weight given to the framework's own sensitivities when blending result themes.
pub const FRAMEWORK_THEME_WEIGHT: f64 = 0.65;

/// `Σ wᵢ·tᵢ / Σ wᵢ`, clamped to [0,1]; 0 when the weights sum to zero.
pub fn fit_score(weights: &ThemeVector, themes: &ThemeVector) -> f64 {
    let w = weights.to_array();
    let t = themes.to_array();
    let total: f64 = w.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let dot: f64 = w.iter().zip(t.iter()).map(|(a, b)| a * b).sum();
    round3(clamp_unit(dot / total))
}

/// Share of the brief's structured fields that are filled in.
pub fn brief_completeness(brief: &DecisionBrief) -> f64 {
    let checks = [
        brief.distinct_alternatives().len() >= 2,
        !brief.criteria.is_empty(),
        !brief.constraints.is_empty(),
        !brief.stakeholders.is_empty(),
        !brief.assumptions.is_empty(),
        brief.has_deadline(),
        brief.has_budget(),
    ];
    checks.iter().filter(|c| **c).count() as f64 / checks.len() as f64
}

/// Theme vector carried by a framework's result.
pub fn result_themes(def: &FrameworkDefinition, decision_themes: &ThemeVector) -> ThemeVector {
    ThemeVector::blend(decision_themes, &def.weights, FRAMEWORK_THEME_WEIGHT)
}

fn axis_action(axis: ThemeAxis) -> &'static str {
    match axis {
        ThemeAxis::Risk => "Run a pre-mortem on the riskiest assumption before committing",
        ThemeAxis::Urgency => "Fix a decision date and plan back from the first milestone",
        ThemeAxis::Opportunity => "Size the upside with a small, time-boxed experiment",
        ThemeAxis::Uncertainty => "Name the unknowns that would flip the decision and test them first",
        ThemeAxis::Resources => "Confirm budget and staffing for the first phase",
        ThemeAxis::StakeholderImpact => "Walk key stakeholders through the options before deciding",
    }
}

const FOLLOW_THROUGH: [&str; 3] = [
    "Write down the decision and the signal that would reverse it",
    "Assign a single owner for follow-through",
    "Schedule a review checkpoint 30 days after the decision",
];

fn top_axes(themes: &ThemeVector, n: usize) -> Vec<ThemeAxis> {
    let mut ranked: Vec<(ThemeAxis, f64)> = themes.axes().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(axis, _)| axis).collect()
}

/// Complete deterministic result for one framework.
pub fn deterministic_result(
    def: &FrameworkDefinition,
    brief: &DecisionBrief,
    decision_themes: &ThemeVector,
) -> FrameworkResult {
    let s = seed::framework_seed(def.id, brief);
    let fit = fit_score(&def.weights, decision_themes);
    let themes = result_themes(def, decision_themes);

    let applicability = round3(clamp_unit(fit + seed::range(s, "applicability", -0.06, 0.06)));
    let confidence = round3(clamp_unit(
        0.45 + 0.25 * brief_completeness(brief) + 0.2 * fit
            - 0.15 * decision_themes.uncertainty
            + seed::range(s, "confidence", -0.05, 0.05),
    ));

    let dominant = themes.dominant_axis();
    let title = if brief.title.trim().is_empty() {
        "this decision".to_string()
    } else {
        format!("\"{}\"", brief.title.trim())
    };

    let mut insights = vec![format!(
        "{} examines {}; for {} the strongest signal is {}.",
        def.name, def.focus, title, dominant
    )];
    let keywords = top_keywords(&brief.corpus(), 3);
    if !keywords.is_empty() {
        insights.push(format!("Recurring themes in the brief: {}.", keywords.join(", ")));
    }
    insights.push(
        if fit >= 0.6 {
            "High fit: this lens matches the decision's profile closely."
        } else if fit >= 0.4 {
            "Moderate fit: read this lens alongside stronger-fitting frameworks."
        } else {
            "Low fit: treat conclusions from this lens as secondary."
        }
        .to_string(),
    );
    if let Some(first) = split_sentences(&brief.statement).first() {
        insights.push(format!("Core question: {}", clip(first, 140)));
    }

    let mut actions: Vec<String> = top_axes(&themes, 2)
        .into_iter()
        .map(|axis| axis_action(axis).to_string())
        .collect();
    if let Some(criterion) = brief.criteria.iter().find(|c| !c.trim().is_empty()) {
        actions.push(format!("Score every option against {}", criterion.trim()));
    }
    actions.push(FOLLOW_THROUGH[seed::pick(s, "follow_through", FOLLOW_THROUGH.len())].to_string());
    let actions = dedup_capped(actions, 4);

    let mut risks: Vec<String> = brief
        .assumptions
        .iter()
        .take(2)
        .map(|a| format!("If '{}' is wrong, the case weakens", a.trim()))
        .collect();
    if let Some(c) = brief.constraints.first() {
        risks.push(format!("{} may limit execution", c.trim()));
    }
    if themes.risk >= 0.5 {
        risks.push("Downside exposure is material".to_string());
    }
    if themes.uncertainty >= 0.5 {
        risks.push("Key inputs are uncertain".to_string());
    }
    risks.push("Execution may drift from plan without clear ownership".to_string());
    let risks = dedup_capped(risks, 4);

    let mut assumptions = dedup_capped(brief.assumptions.clone(), 3);
    if assumptions.is_empty() {
        assumptions.push("The brief reflects the current situation".to_string());
    }

    FrameworkResult {
        framework_id: def.id.to_string(),
        framework_name: def.name.to_string(),
        category: def.category.to_string(),
        applicability_score: applicability,
        confidence,
        insights,
        actions,
        risks,
        assumptions,
        visualization: build_canonical(def.id, brief, &themes),
        themes,
        generation: GenerationMeta::deterministic(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::catalog;
    use crate::cognitive::themes::infer_theme_vector;
    use crate::cognitive::types::GenerationMode;

    fn brief() -> DecisionBrief {
        DecisionBrief {
            decision_id: "d1".into(),
            title: "Adopt a four-day week".into(),
            statement: "Should the engineering team move to a four-day week? Hiring is hard.".into(),
            alternatives: vec!["Pilot one team".into(), "Company-wide".into()],
            criteria: vec!["Retention".into()],
            assumptions: vec!["Output stays flat".into()],
            ..Default::default()
        }
    }

    #[test]
    fn fit_score_is_bounded_and_weighted() {
        let themes = ThemeVector::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let weights = ThemeVector::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(fit_score(&weights, &themes), 0.5);
        assert_eq!(fit_score(&ThemeVector::default(), &themes), 0.0);
        for def in catalog::catalog() {
            let fit = fit_score(&def.weights, &infer_theme_vector(&brief()));
            assert!((0.0..=1.0).contains(&fit));
        }
    }

    #[test]
    fn deterministic_result_is_reproducible() {
        let themes = infer_theme_vector(&brief());
        let def = catalog::find("risk_matrix").unwrap();
        let a = serde_json::to_string(&deterministic_result(def, &brief(), &themes)).unwrap();
        let b = serde_json::to_string(&deterministic_result(def, &brief(), &themes)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic_result_is_populated() {
        let themes = infer_theme_vector(&brief());
        for def in catalog::catalog() {
            let r = deterministic_result(def, &brief(), &themes);
            assert_eq!(r.generation.mode, GenerationMode::Fallback);
            assert!(!r.insights.is_empty() && !r.actions.is_empty() && !r.risks.is_empty());
            assert!((0.0..=1.0).contains(&r.applicability_score));
            assert!((0.0..=1.0).contains(&r.confidence));
        }
    }

    #[test]
    fn completeness_counts_filled_fields() {
        assert_eq!(brief_completeness(&DecisionBrief::default()), 0.0);
        let c = brief_completeness(&brief());
        assert!(c > 0.0 && c < 1.0);
    }
}
