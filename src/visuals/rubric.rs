//! Weighted rubric validation and canonical repair for visualization payloads.
//!
//! A payload passes when the weighted mean of its criterion scores reaches
//! [`PASS_THRESHOLD`]. Consistency criteria are scored strictly: a single
//! contradicting point costs at least half the criterion's weight.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use super::builders::{build_canonical, vital_few};
use super::*;
use crate::brief::DecisionBrief;
use crate::cognitive::catalog;
use crate::cognitive::themes::{ThemeAxis, ThemeVector};
use crate::error::{AnalysisError, Result};

pub const PASS_THRESHOLD: f64 = 0.85;

const TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub name: &'static str,
    pub weight: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricReport {
    pub framework_id: String,
    pub expected_kind: &'static str,
    pub score: f64,
    pub ok: bool,
    pub criteria: Vec<CriterionScore>,
    /// Human-readable description of every criterion that did not score full marks
    pub issues: Vec<String>,
}

impl RubricReport {
    fn from_criteria(framework_id: &str, expected_kind: &'static str, criteria: Vec<CriterionScore>) -> Self {
        let total_weight: f64 = criteria.iter().map(|c| c.weight).sum();
        let score = if total_weight > 0.0 {
            criteria.iter().map(|c| c.weight * c.score).sum::<f64>() / total_weight
        } else {
            0.0
        };
        let issues = criteria
            .iter()
            .filter(|c| c.score < 1.0)
            .map(|c| format!("{} (score {:.2})", c.name, c.score))
            .collect();
        Self {
            framework_id: framework_id.to_string(),
            expected_kind,
            score,
            ok: score >= PASS_THRESHOLD,
            criteria,
            issues,
        }
    }

    fn kind_mismatch(framework_id: &str, expected_kind: &'static str, actual: &str) -> Self {
        Self {
            framework_id: framework_id.to_string(),
            expected_kind,
            score: 0.0,
            ok: false,
            criteria: Vec::new(),
            issues: vec![format!("expected a {expected_kind} chart, got {actual}")],
        }
    }
}

fn criterion(name: &'static str, weight: f64, score: f64) -> CriterionScore {
    CriterionScore {
        name,
        weight,
        score: score.clamp(0.0, 1.0),
    }
}

fn binary(pass: bool) -> f64 {
    if pass { 1.0 } else { 0.0 }
}

fn fraction(ok: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ok as f64 / total as f64
    }
}

/// Full marks only when every item passes; otherwise at most half.
fn strict(ok: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else if ok == total {
        1.0
    } else {
        0.5 * fraction(ok, total)
    }
}

fn in_unit(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Absolute tolerance for small values, relative once magnitudes make 0.01 unrepresentable.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE.max(1e-9 * a.abs().max(b.abs()))
}

fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|i| pred(i)).count()
}

fn unique_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .all(|l| seen.insert(l.trim().to_lowercase()))
}

/// Score a payload against the rubric for the framework's expected chart kind.
pub fn validate(framework_id: &str, payload: &VisualizationPayload) -> RubricReport {
    let expected = expected_kind(framework_id);
    if payload.kind() != expected {
        return RubricReport::kind_mismatch(framework_id, expected, payload.kind());
    }
    let criteria = match payload {
        VisualizationPayload::Swot(c) => swot(c),
        VisualizationPayload::Eisenhower(c) => eisenhower(c),
        VisualizationPayload::BcgMatrix(c) => bcg(c),
        VisualizationPayload::MonteCarlo(c) => monte_carlo(c),
        VisualizationPayload::DecisionMatrix(c) => decision_matrix(c),
        VisualizationPayload::Pareto(c) => pareto(c),
        VisualizationPayload::RiskMatrix(c) => risk_matrix(c),
        VisualizationPayload::FiveForces(c) => five_forces(c),
        VisualizationPayload::Pestle(c) => pestle(c),
        VisualizationPayload::CostBenefit(c) => cost_benefit(c),
        VisualizationPayload::StakeholderMap(c) => stakeholder_map(c),
        VisualizationPayload::ScenarioGrid(c) => scenario_grid(c),
        VisualizationPayload::ThemeRadar(c) => theme_radar(c),
    };
    RubricReport::from_criteria(framework_id, expected, criteria)
}

/// Rebuild the canonical payload for a known framework.
pub fn repair(
    framework_id: &str,
    brief: &DecisionBrief,
    themes: &ThemeVector,
) -> Result<VisualizationPayload> {
    if catalog::find(framework_id).is_none() {
        return Err(AnalysisError::UnknownFramework {
            framework_id: framework_id.to_string(),
        });
    }
    Ok(build_canonical(framework_id, brief, themes))
}

/// Return a payload that passes the rubric, plus a warning when the candidate had to be replaced.
///
/// A missing candidate is replaced silently. A canonical payload that itself fails the
/// rubric is a contract violation and is surfaced as an error.
pub fn ensure_valid(
    framework_id: &str,
    candidate: Option<VisualizationPayload>,
    brief: &DecisionBrief,
    themes: &ThemeVector,
) -> Result<(VisualizationPayload, Option<String>)> {
    let warning = match candidate {
        Some(payload) => {
            let report = validate(framework_id, &payload);
            if report.ok {
                debug!(framework_id, score = report.score, "visualization accepted");
                return Ok((payload, None));
            }
            warn!(
                framework_id,
                score = report.score,
                issues = ?report.issues,
                "visualization failed rubric, repairing"
            );
            Some(format!(
                "visualization repaired (rubric score {:.2}): {}",
                report.score,
                report.issues.join(", ")
            ))
        }
        None => None,
    };

    let repaired = repair(framework_id, brief, themes)?;
    let report = validate(framework_id, &repaired);
    if !report.ok {
        return Err(AnalysisError::VisualizationContractViolation {
            framework_id: framework_id.to_string(),
            issues: report.issues,
        });
    }
    Ok((repaired, warning))
}

fn swot(c: &SwotChart) -> Vec<CriterionScore> {
    let quadrants = c.quadrants();
    let items: Vec<&SwotItem> = quadrants.iter().flat_map(|q| q.iter()).collect();
    vec![
        criterion(
            "all four quadrants populated",
            0.35,
            strict(quadrants.iter().filter(|q| !q.is_empty()).count(), 4),
        ),
        criterion(
            "impacts within [0,1]",
            0.25,
            strict(count(&items, |i| in_unit(i.impact)), items.len()),
        ),
        criterion(
            "labels unique across quadrants",
            0.2,
            binary(unique_labels(items.iter().map(|i| i.label.as_str()))),
        ),
        criterion(
            "each quadrant holds at most six items",
            0.2,
            strict(quadrants.iter().filter(|q| q.len() <= 6).count(), 4),
        ),
    ]
}

fn eisenhower(c: &EisenhowerChart) -> Vec<CriterionScore> {
    let points = &c.points;
    vec![
        criterion(
            "quadrant matches urgency and importance",
            0.4,
            strict(
                count(points, |p| {
                    p.quadrant == EisenhowerQuadrant::classify(p.urgency, p.importance, c.threshold)
                }),
                points.len(),
            ),
        ),
        criterion(
            "quadrant counts match plotted points",
            0.25,
            binary(c.counts == EisenhowerCounts::tally(points)),
        ),
        criterion(
            "mandatory items stay out of eliminate",
            0.2,
            binary(!points
                .iter()
                .any(|p| p.mandatory && p.quadrant == EisenhowerQuadrant::Eliminate)),
        ),
        criterion(
            "coordinates within [0,1]",
            0.15,
            strict(
                count(points, |p| in_unit(p.urgency) && in_unit(p.importance)),
                points.len(),
            ),
        ),
    ]
}

fn bcg(c: &BcgChart) -> Vec<CriterionScore> {
    let items = &c.items;
    vec![
        criterion(
            "quadrant matches growth and share",
            0.45,
            strict(
                count(items, |i| {
                    i.quadrant
                        == BcgQuadrant::classify(
                            i.market_growth,
                            i.relative_share,
                            c.growth_threshold,
                            c.share_threshold,
                        )
                }),
                items.len(),
            ),
        ),
        criterion(
            "values within [0,1]",
            0.2,
            strict(
                count(items, |i| in_unit(i.market_growth) && in_unit(i.relative_share)),
                items.len(),
            ),
        ),
        criterion("at least two items", 0.15, binary(items.len() >= 2)),
        criterion(
            "labels unique",
            0.2,
            binary(unique_labels(items.iter().map(|i| i.label.as_str()))),
        ),
    ]
}

fn monte_carlo(c: &MonteCarloChart) -> Vec<CriterionScore> {
    let bins = &c.bins;
    let contiguous = !bins.is_empty()
        && bins.iter().all(|b| b.lower < b.upper)
        && bins.windows(2).all(|w| (w[0].upper - w[1].lower).abs() < 1e-9);
    let total: u64 = bins.iter().map(|b| u64::from(b.count)).sum();
    let (lo, hi) = match (bins.first(), bins.last()) {
        (Some(f), Some(l)) => (f.lower, l.upper),
        _ => (f64::NAN, f64::NAN),
    };
    let inside = |v: f64| v >= lo - 1e-9 && v <= hi + 1e-9;
    vec![
        criterion("bins contiguous and ascending", 0.3, binary(contiguous)),
        criterion(
            "bin counts sum to trials",
            0.3,
            binary(c.trials > 0 && total == u64::from(c.trials)),
        ),
        criterion(
            "p10 <= p50 <= p90",
            0.25,
            binary(c.p10 <= c.p50 && c.p50 <= c.p90),
        ),
        criterion(
            "percentiles inside histogram range",
            0.15,
            binary(inside(c.p10) && inside(c.p50) && inside(c.p90)),
        ),
    ]
}

fn decision_matrix(c: &DecisionMatrixChart) -> Vec<CriterionScore> {
    let weights: Vec<f64> = c.criteria.iter().map(|w| w.weight).collect();
    let weight_sum: f64 = weights.iter().sum();
    let rows = &c.options;

    let well_formed = |r: &OptionRow| {
        r.scores.len() == weights.len()
            && r.scores
                .iter()
                .all(|s| s.is_finite() && (0.0..=10.0).contains(s))
    };
    let consistent_total = |r: &OptionRow| {
        r.scores.len() == weights.len()
            && close(r.scores.iter().zip(&weights).map(|(s, w)| s * w).sum(), r.total)
    };

    let ranking_ok = {
        let ranked: Option<Vec<&OptionRow>> = c
            .ranking
            .iter()
            .map(|name| rows.iter().find(|r| &r.option == name))
            .collect();
        match ranked {
            Some(ranked) => {
                ranked.len() == rows.len()
                    && unique_labels(c.ranking.iter().map(String::as_str))
                    && ranked.windows(2).all(|w| w[0].total >= w[1].total)
            }
            None => false,
        }
    };

    vec![
        criterion(
            "criterion weights sum to 1",
            0.25,
            binary(!weights.is_empty() && close(weight_sum, 1.0) && weights.iter().all(|w| *w >= 0.0)),
        ),
        criterion(
            "one in-range score per criterion",
            0.25,
            strict(count(rows, |r| well_formed(r)), rows.len()),
        ),
        criterion(
            "totals equal weighted sums",
            0.3,
            strict(count(rows, |r| consistent_total(r)), rows.len()),
        ),
        criterion("ranking ordered by total", 0.2, binary(ranking_ok)),
    ]
}

fn pareto(c: &ParetoChart) -> Vec<CriterionScore> {
    let items = &c.items;
    let total: f64 = items.iter().map(|i| i.value).sum();
    let sorted = items.windows(2).all(|w| w[0].value >= w[1].value);

    let mut running = 0.0;
    let mut cumulative_ok = 0;
    for item in items {
        running += item.value;
        if total > 0.0 && (item.cumulative_pct - running / total * 100.0).abs() <= 0.5 {
            cumulative_ok += 1;
        }
    }
    let ends_at_100 = items
        .last()
        .is_some_and(|i| (i.cumulative_pct - 100.0).abs() <= 0.5);
    let cumulative_score = if ends_at_100 {
        strict(cumulative_ok, items.len())
    } else {
        0.0
    };

    vec![
        criterion("values sorted descending", 0.25, binary(!items.is_empty() && sorted)),
        criterion("cumulative percentages consistent", 0.35, cumulative_score),
        criterion(
            "vital few reach the cutoff",
            0.25,
            binary(!c.vital_few.is_empty() && c.vital_few == vital_few(items, c.cutoff_pct)),
        ),
        criterion(
            "values non-negative",
            0.15,
            strict(count(items, |i| i.value.is_finite() && i.value >= 0.0), items.len()),
        ),
    ]
}

fn risk_matrix(c: &RiskMatrixChart) -> Vec<CriterionScore> {
    let risks = &c.risks;
    vec![
        criterion(
            "level matches probability times impact",
            0.45,
            strict(
                count(risks, |r| r.level == RiskLevel::classify(r.probability, r.impact)),
                risks.len(),
            ),
        ),
        criterion(
            "level counts match plotted risks",
            0.25,
            binary(c.counts == RiskLevelCounts::tally(risks)),
        ),
        criterion(
            "coordinates within [0,1]",
            0.15,
            strict(
                count(risks, |r| in_unit(r.probability) && in_unit(r.impact)),
                risks.len(),
            ),
        ),
        criterion("at least three risks", 0.15, binary(risks.len() >= 3)),
    ]
}

fn five_forces(c: &FiveForcesChart) -> Vec<CriterionScore> {
    let forces = &c.forces;
    let distinct: HashSet<CompetitiveForce> = forces.iter().map(|f| f.force).collect();
    let mean = if forces.is_empty() {
        f64::NAN
    } else {
        forces.iter().map(|f| f.intensity).sum::<f64>() / forces.len() as f64
    };
    vec![
        criterion(
            "exactly five distinct forces",
            0.4,
            binary(forces.len() == 5 && distinct.len() == 5),
        ),
        criterion(
            "intensities within [0,1]",
            0.2,
            strict(count(forces, |f| in_unit(f.intensity)), forces.len()),
        ),
        criterion(
            "overall intensity is the mean",
            0.25,
            binary(close(mean, c.overall_intensity)),
        ),
        criterion(
            "every force has a rationale",
            0.15,
            fraction(count(forces, |f| !f.rationale.trim().is_empty()), forces.len()),
        ),
    ]
}

fn pestle(c: &PestleChart) -> Vec<CriterionScore> {
    let factors = &c.factors;
    let distinct: HashSet<PestleDimension> = factors.iter().map(|f| f.dimension).collect();
    vec![
        criterion(
            "all six dimensions present once",
            0.45,
            binary(factors.len() == 6 && distinct.len() == 6),
        ),
        criterion(
            "impacts within [0,1]",
            0.25,
            strict(count(factors, |f| in_unit(f.impact)), factors.len()),
        ),
        criterion(
            "every factor cites a signal",
            0.3,
            fraction(
                count(factors, |f| f.signals.iter().any(|s| !s.trim().is_empty())),
                factors.len(),
            ),
        ),
    ]
}

fn cost_benefit(c: &CostBenefitChart) -> Vec<CriterionScore> {
    let lines: Vec<&LineItem> = c.costs.iter().chain(&c.benefits).collect();
    let cost_sum: f64 = c.costs.iter().map(|l| l.amount).sum();
    let benefit_sum: f64 = c.benefits.iter().map(|l| l.amount).sum();
    let ratio_ok = if c.total_cost > 0.0 {
        close(c.benefit_cost_ratio, c.total_benefit / c.total_cost)
    } else {
        c.benefit_cost_ratio == 0.0
    };
    vec![
        criterion(
            "amounts non-negative",
            0.2,
            strict(count(&lines, |l| l.amount.is_finite() && l.amount >= 0.0), lines.len()),
        ),
        criterion(
            "totals equal line-item sums",
            0.3,
            binary(
                !c.costs.is_empty()
                    && !c.benefits.is_empty()
                    && close(cost_sum, c.total_cost)
                    && close(benefit_sum, c.total_benefit),
            ),
        ),
        criterion(
            "net value is benefits minus costs",
            0.25,
            binary(close(c.net_value, c.total_benefit - c.total_cost)),
        ),
        criterion("benefit-cost ratio consistent", 0.25, binary(ratio_ok)),
    ]
}

fn stakeholder_map(c: &StakeholderChart) -> Vec<CriterionScore> {
    let points = &c.stakeholders;
    vec![
        criterion(
            "quadrant matches power and interest",
            0.5,
            strict(
                count(points, |p| {
                    p.quadrant == StakeholderQuadrant::classify(p.power, p.interest, c.threshold)
                }),
                points.len(),
            ),
        ),
        criterion(
            "values within [0,1]",
            0.2,
            strict(
                count(points, |p| in_unit(p.power) && in_unit(p.interest)),
                points.len(),
            ),
        ),
        criterion(
            "stakeholder names unique",
            0.15,
            binary(unique_labels(points.iter().map(|p| p.name.as_str()))),
        ),
        criterion("at least one stakeholder", 0.15, binary(!points.is_empty())),
    ]
}

fn scenario_grid(c: &ScenarioChart) -> Vec<CriterionScore> {
    let cells = &c.scenarios;
    let combos: HashSet<(bool, bool)> = cells.iter().map(|s| (s.x_high, s.y_high)).collect();
    let probability_sum: f64 = cells.iter().map(|s| s.probability).sum();
    vec![
        criterion(
            "four distinct polarity combinations",
            0.45,
            binary(cells.len() == 4 && combos.len() == 4),
        ),
        criterion(
            "probabilities sum to 1",
            0.3,
            binary(!cells.is_empty() && close(probability_sum, 1.0)),
        ),
        criterion(
            "probabilities within [0,1]",
            0.1,
            strict(count(cells, |s| in_unit(s.probability)), cells.len()),
        ),
        criterion(
            "every scenario has a narrative",
            0.15,
            fraction(count(cells, |s| !s.narrative.trim().is_empty()), cells.len()),
        ),
    ]
}

fn theme_radar(c: &ThemeRadarChart) -> Vec<CriterionScore> {
    let axes: HashSet<ThemeAxis> = c.points.iter().map(|p| p.axis).collect();
    vec![
        criterion(
            "all six axes present once",
            0.5,
            binary(c.points.len() == ThemeAxis::ALL.len() && axes.len() == ThemeAxis::ALL.len()),
        ),
        criterion(
            "values within [0,1]",
            0.35,
            strict(count(&c.points, |p| in_unit(p.value)), c.points.len()),
        ),
        criterion("signal within [0,1]", 0.15, binary(in_unit(c.signal))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> DecisionBrief {
        DecisionBrief {
            decision_id: "d1".into(),
            title: "Replace the billing platform".into(),
            statement: "Decide whether to migrate billing before the renewal deadline".into(),
            alternatives: vec!["Migrate now".into(), "Extend contract".into()],
            stakeholders: vec!["Finance".into(), "Support".into(), "Customers".into()],
            criteria: vec!["Cost".into(), "Reliability".into()],
            constraints: vec!["No downtime in December".into()],
            assumptions: vec!["Vendor API is stable".into()],
            deadline: Some("2026-12-01".into()),
            budget: Some("250k".into()),
            ..Default::default()
        }
    }

    fn themes() -> ThemeVector {
        ThemeVector::new(0.62, 0.55, 0.48, 0.51, 0.66, 0.44)
    }

    #[test]
    fn canonical_payloads_pass_for_every_framework() {
        for f in catalog::catalog() {
            let payload = build_canonical(f.id, &brief(), &themes());
            let report = validate(f.id, &payload);
            assert!(report.ok, "{} failed: {:?}", f.id, report.issues);
        }
    }

    #[test]
    fn wrong_kind_scores_zero() {
        let payload = build_canonical("pareto", &brief(), &themes());
        let report = validate("swot", &payload);
        assert!(!report.ok);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn eisenhower_with_contradicting_quadrant_is_rejected() {
        let VisualizationPayload::Eisenhower(mut chart) =
            build_canonical("eisenhower", &brief(), &themes())
        else {
            panic!("wrong kind");
        };
        let point = &mut chart.points[0];
        point.urgency = 0.9;
        point.importance = 0.9;
        point.quadrant = EisenhowerQuadrant::Eliminate;
        chart.counts = EisenhowerCounts::tally(&chart.points);
        let report = validate("eisenhower", &VisualizationPayload::Eisenhower(chart));
        assert!(!report.ok, "score {}", report.score);
    }

    fn other_bcg(q: BcgQuadrant) -> BcgQuadrant {
        if q == BcgQuadrant::Dog { BcgQuadrant::Star } else { BcgQuadrant::Dog }
    }

    fn other_level(l: RiskLevel) -> RiskLevel {
        if l == RiskLevel::Low { RiskLevel::Critical } else { RiskLevel::Low }
    }

    fn other_stakeholder(q: StakeholderQuadrant) -> StakeholderQuadrant {
        if q == StakeholderQuadrant::Monitor {
            StakeholderQuadrant::ManageClosely
        } else {
            StakeholderQuadrant::Monitor
        }
    }

    #[test]
    fn one_targeted_corruption_per_kind_is_rejected() {
        type Corrupt = fn(&mut VisualizationPayload);
        let cases: &[(&str, &str, Corrupt)] = &[
            ("swot", "empty strengths quadrant", |p| {
                if let VisualizationPayload::Swot(c) = p {
                    c.strengths.clear();
                }
            }),
            ("eisenhower", "quadrant contradicts coordinates", |p| {
                if let VisualizationPayload::Eisenhower(c) = p {
                    let pt = &mut c.points[0];
                    pt.quadrant = match pt.quadrant {
                        EisenhowerQuadrant::DoFirst => EisenhowerQuadrant::Delegate,
                        _ => EisenhowerQuadrant::DoFirst,
                    };
                }
            }),
            ("bcg_matrix", "quadrant contradicts growth and share", |p| {
                if let VisualizationPayload::BcgMatrix(c) = p {
                    c.items[0].quadrant = other_bcg(c.items[0].quadrant);
                }
            }),
            ("risk_matrix", "level contradicts exposure", |p| {
                if let VisualizationPayload::RiskMatrix(c) = p {
                    c.risks[0].level = other_level(c.risks[0].level);
                    c.counts = RiskLevelCounts::tally(&c.risks);
                }
            }),
            ("risk_matrix", "counts disagree with plotted risks", |p| {
                if let VisualizationPayload::RiskMatrix(c) = p {
                    c.counts.low += 2;
                }
            }),
            ("stakeholder_map", "quadrant contradicts power and interest", |p| {
                if let VisualizationPayload::StakeholderMap(c) = p {
                    c.stakeholders[0].quadrant = other_stakeholder(c.stakeholders[0].quadrant);
                }
            }),
            ("decision_matrix", "total differs from weighted sum", |p| {
                if let VisualizationPayload::DecisionMatrix(c) = p {
                    c.options[0].total += 1.0;
                }
            }),
            ("decision_matrix", "ranking names an unknown option", |p| {
                if let VisualizationPayload::DecisionMatrix(c) = p {
                    c.ranking[0] = "Not an option".into();
                }
            }),
            ("pareto", "cumulative percentage drifts", |p| {
                if let VisualizationPayload::Pareto(c) = p {
                    c.items[0].cumulative_pct += 5.0;
                }
            }),
            ("pareto", "vital few missing", |p| {
                if let VisualizationPayload::Pareto(c) = p {
                    c.vital_few.clear();
                }
            }),
            ("monte_carlo", "bin counts miss the trial count", |p| {
                if let VisualizationPayload::MonteCarlo(c) = p {
                    c.trials += 1;
                }
            }),
            ("monte_carlo", "percentiles out of order", |p| {
                if let VisualizationPayload::MonteCarlo(c) = p {
                    c.p10 = c.p90 + 1.0;
                }
            }),
            ("porters_five_forces", "overall intensity is not the mean", |p| {
                if let VisualizationPayload::FiveForces(c) = p {
                    c.overall_intensity += 0.2;
                }
            }),
            ("pestle", "one dimension dropped", |p| {
                if let VisualizationPayload::Pestle(c) = p {
                    c.factors.pop();
                }
            }),
            ("cost_benefit", "net value is not benefits minus costs", |p| {
                if let VisualizationPayload::CostBenefit(c) = p {
                    c.net_value += 10.0;
                }
            }),
            ("cost_benefit", "ratio inconsistent with totals", |p| {
                if let VisualizationPayload::CostBenefit(c) = p {
                    c.benefit_cost_ratio += 0.5;
                }
            }),
            ("scenario_planning", "probabilities do not sum to 1", |p| {
                if let VisualizationPayload::ScenarioGrid(c) = p {
                    c.scenarios[0].probability = (c.scenarios[0].probability + 0.3).min(1.0);
                    c.scenarios[1].probability = (c.scenarios[1].probability + 0.3).min(1.0);
                }
            }),
            ("ooda", "theme radar axis missing", |p| {
                if let VisualizationPayload::ThemeRadar(c) = p {
                    c.points.pop();
                }
            }),
        ];

        let covered: HashSet<&str> = cases.iter().map(|(id, _, _)| expected_kind(id)).collect();
        assert_eq!(covered.len(), 13, "every chart kind needs a malformed case");

        for &(framework_id, what, corrupt) in cases {
            let canonical = build_canonical(framework_id, &brief(), &themes());
            assert!(validate(framework_id, &canonical).ok, "{framework_id} canonical");
            let mut payload = canonical.clone();
            corrupt(&mut payload);
            assert_ne!(payload, canonical, "{framework_id}: {what} changed nothing");
            let report = validate(framework_id, &payload);
            assert!(!report.ok, "{framework_id}: {what} passed with score {}", report.score);
        }
    }

    #[test]
    fn ensure_valid_repairs_and_warns() {
        let bad = VisualizationPayload::Pestle(PestleChart { factors: vec![] });
        let (payload, warning) = ensure_valid("pestle", Some(bad), &brief(), &themes()).unwrap();
        assert!(validate("pestle", &payload).ok);
        assert!(warning.unwrap().contains("repaired"));
    }

    #[test]
    fn ensure_valid_accepts_good_candidate_without_warning() {
        let good = build_canonical("swot", &brief(), &themes());
        let (payload, warning) =
            ensure_valid("swot", Some(good.clone()), &brief(), &themes()).unwrap();
        assert_eq!(payload, good);
        assert!(warning.is_none());
    }

    #[test]
    fn repair_rejects_unknown_framework() {
        let err = repair("not_a_framework", &brief(), &themes()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownFramework { .. }));
    }
}
