//! Canonical chart builders.
//!
//! Every builder is a pure function of the framework id, the brief and the result's theme
//! vector, so the same inputs always produce a byte-identical payload. Builders classify
//! points from their already-rounded coordinates, which keeps them consistent with the rubric.

use once_cell::sync::Lazy;
use regex::Regex;

use super::*;
use crate::brief::DecisionBrief;
use crate::cognitive::framework::{dedup_capped, top_keywords};
use crate::cognitive::seed;
use crate::cognitive::themes::{ThemeAxis, ThemeVector, clamp_unit, round3};

const QUADRANT_THRESHOLD: f64 = 0.5;
const MONTE_CARLO_TRIALS: u32 = 1000;
const MONTE_CARLO_BINS: usize = 10;
const PARETO_CUTOFF: f64 = 80.0;

/// Build the canonical payload for a framework. Non-deep-tier frameworks get a theme radar.
pub fn build_canonical(
    framework_id: &str,
    brief: &DecisionBrief,
    themes: &ThemeVector,
) -> VisualizationPayload {
    let ctx = Ctx {
        brief,
        themes,
        seed: seed::framework_seed(framework_id, brief),
    };
    match expected_kind(framework_id) {
        "swot" => VisualizationPayload::Swot(swot(&ctx)),
        "eisenhower" => VisualizationPayload::Eisenhower(eisenhower(&ctx)),
        "bcg_matrix" => VisualizationPayload::BcgMatrix(bcg(&ctx)),
        "monte_carlo" => VisualizationPayload::MonteCarlo(monte_carlo(&ctx)),
        "decision_matrix" => VisualizationPayload::DecisionMatrix(decision_matrix(&ctx)),
        "pareto" => VisualizationPayload::Pareto(pareto(&ctx)),
        "risk_matrix" => VisualizationPayload::RiskMatrix(risk_matrix(&ctx)),
        "five_forces" => VisualizationPayload::FiveForces(five_forces(&ctx)),
        "pestle" => VisualizationPayload::Pestle(pestle(&ctx)),
        "cost_benefit" => VisualizationPayload::CostBenefit(cost_benefit(&ctx)),
        "stakeholder_map" => VisualizationPayload::StakeholderMap(stakeholder_map(&ctx)),
        "scenario_grid" => VisualizationPayload::ScenarioGrid(scenario_grid(&ctx)),
        _ => VisualizationPayload::ThemeRadar(theme_radar(&ctx)),
    }
}

struct Ctx<'a> {
    brief: &'a DecisionBrief,
    themes: &'a ThemeVector,
    seed: u64,
}

impl Ctx<'_> {
    fn unit(&self, salt: &str) -> f64 {
        seed::unit(self.seed, salt)
    }

    /// `base` nudged by a seeded offset in `[-spread, spread)`, clamped and rounded.
    fn jittered(&self, base: f64, salt: &str, spread: f64) -> f64 {
        round3(clamp_unit(base + seed::range(self.seed, salt, -spread, spread)))
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Brief-derived labels, or the defaults when the brief has none.
fn labels_or(items: Vec<String>, defaults: &[&str], cap: usize) -> Vec<String> {
    let items = dedup_capped(items, cap);
    if items.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        items
    }
}

fn pad_to(mut items: Vec<String>, defaults: &[&str], min: usize, cap: usize) -> Vec<String> {
    for d in defaults {
        if items.len() >= min {
            break;
        }
        if !items.iter().any(|i| i.eq_ignore_ascii_case(d)) {
            items.push(d.to_string());
        }
    }
    items.truncate(cap);
    items
}

fn swot(ctx: &Ctx) -> SwotChart {
    let t = ctx.themes;
    let brief = ctx.brief;
    let quadrant = |name: &str, labels: Vec<String>, base: f64| -> Vec<SwotItem> {
        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| SwotItem {
                impact: ctx.jittered(base, &format!("swot:{name}:{i}"), 0.12),
                label,
            })
            .collect()
    };

    let strengths = labels_or(
        brief
            .criteria
            .iter()
            .map(|c| format!("Measurable against {c}"))
            .collect(),
        &["Decision has a clear owner", "Problem statement is explicit"],
        3,
    );
    let weaknesses = labels_or(
        brief
            .constraints
            .iter()
            .map(|c| format!("Constrained by {c}"))
            .collect(),
        &["Limited evidence base", "Delivery capacity is untested"],
        3,
    );
    let opportunities = labels_or(
        top_keywords(&brief.corpus(), 3)
            .into_iter()
            .map(|k| format!("Upside around {k}"))
            .collect(),
        &["Early-mover advantage"],
        3,
    );
    let threats = labels_or(
        brief
            .assumptions
            .iter()
            .map(|a| format!("Assumption may not hold: {a}"))
            .collect(),
        &["Execution slips against plan", "Stakeholder resistance"],
        3,
    );

    SwotChart {
        strengths: quadrant("s", strengths, 0.3 + 0.5 * t.opportunity),
        weaknesses: quadrant("w", weaknesses, 0.2 + 0.6 * t.resources),
        opportunities: quadrant("o", opportunities, 0.2 + 0.7 * t.opportunity),
        threats: quadrant("t", threats, 0.2 + 0.7 * t.risk),
    }
}

fn eisenhower(ctx: &Ctx) -> EisenhowerChart {
    let t = ctx.themes;
    let brief = ctx.brief;

    let mut tasks: Vec<(String, bool)> = Vec::new();
    let mut push = |label: String, mandatory: bool| {
        if !tasks.iter().any(|(l, _)| l.eq_ignore_ascii_case(&label)) && tasks.len() < 6 {
            tasks.push((label, mandatory));
        }
    };
    for c in dedup_capped(brief.constraints.clone(), 2) {
        push(format!("Satisfy {c}"), true);
    }
    for c in dedup_capped(brief.criteria.clone(), 2) {
        push(format!("Validate {c}"), false);
    }
    for a in brief.distinct_alternatives().into_iter().take(2) {
        push(format!("Prepare {a}"), false);
    }
    for d in [
        "Confirm decision owner",
        "Gather missing evidence",
        "Brief affected stakeholders",
    ] {
        push(d.to_string(), false);
    }

    let points: Vec<EisenhowerPoint> = tasks
        .into_iter()
        .enumerate()
        .map(|(i, (label, mandatory))| {
            let urgency = ctx.jittered(t.urgency, &format!("eis:u:{i}"), 0.25);
            let mut importance =
                ctx.jittered(0.5 * t.opportunity + 0.5 * t.risk, &format!("eis:i:{i}"), 0.25);
            if mandatory {
                importance = importance.max(0.6);
            }
            EisenhowerPoint {
                quadrant: EisenhowerQuadrant::classify(urgency, importance, QUADRANT_THRESHOLD),
                label,
                urgency,
                importance,
                mandatory,
            }
        })
        .collect();

    EisenhowerChart {
        threshold: QUADRANT_THRESHOLD,
        counts: EisenhowerCounts::tally(&points),
        points,
    }
}

fn bcg(ctx: &Ctx) -> BcgChart {
    let t = ctx.themes;
    let items = ctx
        .brief
        .candidate_options()
        .into_iter()
        .take(4)
        .enumerate()
        .map(|(i, label)| {
            let market_growth = ctx.jittered(t.opportunity, &format!("bcg:g:{i}"), 0.3);
            let relative_share =
                ctx.jittered(0.2 + 0.6 * (1.0 - t.uncertainty), &format!("bcg:s:{i}"), 0.3);
            BcgItem {
                quadrant: BcgQuadrant::classify(
                    market_growth,
                    relative_share,
                    QUADRANT_THRESHOLD,
                    QUADRANT_THRESHOLD,
                ),
                label,
                market_growth,
                relative_share,
            }
        })
        .collect();
    BcgChart {
        growth_threshold: QUADRANT_THRESHOLD,
        share_threshold: QUADRANT_THRESHOLD,
        items,
    }
}

fn monte_carlo(ctx: &Ctx) -> MonteCarloChart {
    let t = ctx.themes;
    let center = 50.0 + 30.0 * (t.opportunity - t.risk);
    let spread = 10.0 + 25.0 * t.uncertainty;

    // sum of three uniforms: mean 1.5, sd 0.5
    let mut samples: Vec<f64> = (0..MONTE_CARLO_TRIALS)
        .map(|i| {
            let z = (ctx.unit(&format!("mc:{i}:a"))
                + ctx.unit(&format!("mc:{i}:b"))
                + ctx.unit(&format!("mc:{i}:c"))
                - 1.5)
                / 0.5;
            (center + spread * z).clamp(0.0, 100.0)
        })
        .collect();
    samples.sort_by(|a, b| a.total_cmp(b));

    let width = 100.0 / MONTE_CARLO_BINS as f64;
    let mut bins: Vec<HistogramBin> = (0..MONTE_CARLO_BINS)
        .map(|i| HistogramBin {
            lower: i as f64 * width,
            upper: (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for s in &samples {
        let idx = ((s / width) as usize).min(MONTE_CARLO_BINS - 1);
        bins[idx].count += 1;
    }

    let percentile = |p: f64| -> f64 {
        let idx = (p * (samples.len() - 1) as f64).round() as usize;
        round3(samples[idx])
    };
    let mean = round3(samples.iter().sum::<f64>() / samples.len() as f64);

    MonteCarloChart {
        metric: "outcome index".to_string(),
        trials: MONTE_CARLO_TRIALS,
        p10: percentile(0.10),
        p50: percentile(0.50),
        p90: percentile(0.90),
        mean,
        bins,
    }
}

fn decision_matrix(ctx: &Ctx) -> DecisionMatrixChart {
    let names = labels_or(
        ctx.brief.criteria.clone(),
        &["Strategic impact", "Feasibility", "Risk exposure", "Cost"],
        5,
    );
    let raw: Vec<f64> = (0..names.len())
        .map(|i| 0.5 + ctx.unit(&format!("dm:w:{i}")))
        .collect();
    let raw_total: f64 = raw.iter().sum();
    let mut weights: Vec<f64> = raw.iter().map(|r| round3(r / raw_total)).collect();
    if let Some((last, rest)) = weights.split_last_mut() {
        *last = round3(1.0 - rest.iter().sum::<f64>());
    }

    let criteria: Vec<CriterionWeight> = names
        .into_iter()
        .zip(weights.iter().copied())
        .map(|(name, weight)| CriterionWeight { name, weight })
        .collect();

    let options: Vec<OptionRow> = ctx
        .brief
        .candidate_options()
        .into_iter()
        .take(5)
        .enumerate()
        .map(|(oi, option)| {
            let scores: Vec<f64> = (0..criteria.len())
                .map(|ci| round1(4.0 + 5.0 * ctx.unit(&format!("dm:s:{oi}:{ci}"))))
                .collect();
            let total = round3(scores.iter().zip(&weights).map(|(s, w)| s * w).sum());
            OptionRow {
                option,
                scores,
                total,
            }
        })
        .collect();

    let mut ranked: Vec<&OptionRow> = options.iter().collect();
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.option.cmp(&b.option)));
    let ranking = ranked.into_iter().map(|r| r.option.clone()).collect();

    DecisionMatrixChart {
        criteria,
        options,
        ranking,
    }
}

/// Labels up to and including the first item whose cumulative share reaches `cutoff`.
pub(crate) fn vital_few(items: &[ParetoItem], cutoff: f64) -> Vec<String> {
    let mut out = Vec::new();
    for item in items {
        out.push(item.label.clone());
        if item.cumulative_pct >= cutoff - 1e-9 {
            break;
        }
    }
    out
}

fn pareto(ctx: &Ctx) -> ParetoChart {
    let brief = ctx.brief;
    let drivers: Vec<String> = brief
        .constraints
        .iter()
        .chain(&brief.criteria)
        .chain(&brief.assumptions)
        .cloned()
        .collect();
    let drivers = pad_to(
        dedup_capped(drivers, 7),
        &[
            "Execution capacity",
            "Budget pressure",
            "Stakeholder alignment",
            "Market timing",
            "Technical risk",
        ],
        4,
        7,
    );

    let mut weighted: Vec<(String, f64)> = drivers
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let value =
                round1(100.0 * 0.7f64.powi(i as i32) * (0.8 + 0.4 * ctx.unit(&format!("par:{i}"))));
            (label, value)
        })
        .collect();
    weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total: f64 = weighted.iter().map(|(_, v)| v).sum();
    let count = weighted.len();
    let mut running = 0.0;
    let items: Vec<ParetoItem> = weighted
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            running += value;
            let cumulative_pct = if i + 1 == count {
                100.0
            } else {
                round1(running / total * 100.0)
            };
            ParetoItem {
                label,
                value,
                cumulative_pct,
            }
        })
        .collect();

    ParetoChart {
        cutoff_pct: PARETO_CUTOFF,
        vital_few: vital_few(&items, PARETO_CUTOFF),
        items,
    }
}

fn risk_matrix(ctx: &Ctx) -> RiskMatrixChart {
    let t = ctx.themes;
    let brief = ctx.brief;
    let mut labels: Vec<String> = dedup_capped(
        brief
            .assumptions
            .iter()
            .map(|a| format!("{a} proves false"))
            .collect::<Vec<_>>(),
        3,
    );
    labels.extend(dedup_capped(
        brief.constraints.iter().map(|c| format!("{c} is breached")),
        2,
    ));
    let labels = pad_to(
        labels,
        &[
            "Delivery slips past plan",
            "Costs overrun the budget",
            "Key stakeholders resist",
            "Demand falls short",
        ],
        4,
        6,
    );

    let risks: Vec<RiskPoint> = labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let probability = ctx.jittered(0.1 + 0.8 * t.uncertainty, &format!("risk:p:{i}"), 0.25);
            let impact = ctx.jittered(0.15 + 0.8 * t.risk, &format!("risk:i:{i}"), 0.25);
            RiskPoint {
                level: RiskLevel::classify(probability, impact),
                label,
                probability,
                impact,
            }
        })
        .collect();

    RiskMatrixChart {
        counts: RiskLevelCounts::tally(&risks),
        risks,
    }
}

fn five_forces(ctx: &Ctx) -> FiveForcesChart {
    let t = ctx.themes;
    let forces: Vec<ForceScore> = CompetitiveForce::ALL
        .iter()
        .map(|&force| {
            let (base, rationale) = match force {
                CompetitiveForce::Rivalry => (
                    0.1 + 0.4 * t.opportunity + 0.4 * t.risk,
                    "Attractive, risky markets draw direct competitors",
                ),
                CompetitiveForce::NewEntrants => (
                    0.1 + 0.6 * t.opportunity,
                    "Visible upside lowers the bar for new entrants",
                ),
                CompetitiveForce::Substitutes => (
                    0.1 + 0.6 * t.uncertainty,
                    "Unsettled demand leaves room for substitutes",
                ),
                CompetitiveForce::BuyerPower => (
                    0.1 + 0.7 * t.stakeholder_impact,
                    "Influential customers and partners can dictate terms",
                ),
                CompetitiveForce::SupplierPower => (
                    0.1 + 0.7 * t.resources,
                    "Tight resources hand leverage to suppliers",
                ),
            };
            ForceScore {
                force,
                intensity: ctx.jittered(base, &format!("ff:{force:?}"), 0.1),
                rationale: rationale.to_string(),
            }
        })
        .collect();

    let overall_intensity =
        round3(forces.iter().map(|f| f.intensity).sum::<f64>() / forces.len() as f64);
    FiveForcesChart {
        forces,
        overall_intensity,
    }
}

fn pestle_keywords(dimension: PestleDimension) -> &'static [&'static str] {
    match dimension {
        PestleDimension::Political => &["policy", "government", "election", "regulat", "tariff"],
        PestleDimension::Economic => &["budget", "cost", "revenue", "price", "market", "inflation"],
        PestleDimension::Social => &["customer", "employee", "team", "community", "culture"],
        PestleDimension::Technological => {
            &["platform", "software", "technology", "data", "automation", "integration"]
        }
        PestleDimension::Legal => &["legal", "compliance", "contract", "license", "gdpr", "privacy"],
        PestleDimension::Environmental => {
            &["energy", "carbon", "climate", "sustainab", "emission"]
        }
    }
}

fn pestle(ctx: &Ctx) -> PestleChart {
    let t = ctx.themes;
    let corpus = ctx.brief.corpus();
    let factors = PestleDimension::ALL
        .iter()
        .map(|&dimension| {
            let base = match dimension {
                PestleDimension::Political => 0.5 * t.risk + 0.3 * t.stakeholder_impact,
                PestleDimension::Economic => 0.6 * t.resources + 0.2 * t.opportunity,
                PestleDimension::Social => 0.7 * t.stakeholder_impact,
                PestleDimension::Technological => 0.4 * t.opportunity + 0.3 * t.uncertainty,
                PestleDimension::Legal => 0.7 * t.risk,
                PestleDimension::Environmental => 0.4 * t.uncertainty,
            };
            let mut signals: Vec<String> = pestle_keywords(dimension)
                .iter()
                .filter(|k| corpus.contains(*k))
                .map(|k| format!("brief mentions '{k}'"))
                .collect();
            if signals.is_empty() {
                let name = format!("{dimension:?}").to_lowercase();
                signals.push(format!("no direct {name} signal in the brief"));
            }
            let boosted = base + 0.05 * signals.len() as f64;
            PestleFactor {
                dimension,
                impact: ctx.jittered(boosted, &format!("pe:{dimension:?}"), 0.1),
                signals,
            }
        })
        .collect();
    PestleChart { factors }
}

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*([kKmMbB])?").expect("valid amount regex"));

/// Largest chart scale, in thousands. Budgets above it are plotted at the ceiling.
const MAX_BUDGET_THOUSANDS: f64 = 1e9;

/// Parse a free-form budget like "$400k" or "1,200,000" into thousands.
///
/// Non-finite amounts are rejected and the rest are capped at [`MAX_BUDGET_THOUSANDS`].
pub(crate) fn parse_budget_thousands(budget: &str) -> Option<f64> {
    let caps = AMOUNT_RE.captures(budget)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let thousands = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(s) if s == "k" => number,
        Some(s) if s == "m" => number * 1_000.0,
        Some(s) if s == "b" => number * 1_000_000.0,
        _ => number / 1_000.0,
    };
    (thousands.is_finite() && thousands > 0.0).then(|| thousands.min(MAX_BUDGET_THOUSANDS))
}

fn cost_benefit(ctx: &Ctx) -> CostBenefitChart {
    let t = ctx.themes;
    let brief = ctx.brief;
    let scale = brief
        .budget
        .as_deref()
        .and_then(parse_budget_thousands)
        .unwrap_or(100.0)
        .max(1.0);

    let mut costs = vec![
        LineItem {
            label: "Upfront investment".into(),
            amount: round2(scale * (0.5 + 0.3 * t.resources)),
        },
        LineItem {
            label: "Operating overhead".into(),
            amount: round2(scale * (0.15 + 0.2 * ctx.unit("cb:ops"))),
        },
    ];
    for (i, c) in dedup_capped(brief.constraints.clone(), 2).into_iter().enumerate() {
        costs.push(LineItem {
            label: format!("Working within {c}"),
            amount: round2(scale * 0.1 * (0.5 + ctx.unit(&format!("cb:c:{i}")))),
        });
    }

    let mut benefits = vec![
        LineItem {
            label: "Direct value captured".into(),
            amount: round2(scale * (0.4 + 0.8 * t.opportunity)),
        },
        LineItem {
            label: "Efficiency gains".into(),
            amount: round2(scale * (0.1 + 0.3 * ctx.unit("cb:eff"))),
        },
    ];
    for (i, c) in dedup_capped(brief.criteria.clone(), 2).into_iter().enumerate() {
        benefits.push(LineItem {
            label: format!("Progress on {c}"),
            amount: round2(scale * 0.15 * (0.5 + ctx.unit(&format!("cb:b:{i}")))),
        });
    }

    let total_cost = round2(costs.iter().map(|c| c.amount).sum());
    let total_benefit = round2(benefits.iter().map(|b| b.amount).sum());
    let benefit_cost_ratio = if total_cost > 0.0 {
        round3(total_benefit / total_cost)
    } else {
        0.0
    };

    CostBenefitChart {
        unit: "thousands".to_string(),
        net_value: round2(total_benefit - total_cost),
        costs,
        benefits,
        total_cost,
        total_benefit,
        benefit_cost_ratio,
    }
}

fn stakeholder_map(ctx: &Ctx) -> StakeholderChart {
    let t = ctx.themes;
    let names = labels_or(
        ctx.brief.stakeholders.clone(),
        &["Leadership", "Customers", "Delivery team", "Finance"],
        8,
    );
    let stakeholders = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let power = ctx.jittered(
                0.3 + 0.5 * ctx.unit(&format!("sh:p:{i}")) + 0.2 * (t.stakeholder_impact - 0.5),
                &format!("sh:pj:{i}"),
                0.05,
            );
            let interest = ctx.jittered(
                0.6 * t.stakeholder_impact + 0.4 * ctx.unit(&format!("sh:i:{i}")),
                &format!("sh:ij:{i}"),
                0.05,
            );
            StakeholderPoint {
                quadrant: StakeholderQuadrant::classify(power, interest, QUADRANT_THRESHOLD),
                name,
                power,
                interest,
            }
        })
        .collect();
    StakeholderChart {
        threshold: QUADRANT_THRESHOLD,
        stakeholders,
    }
}

fn scenario_axis(axis: ThemeAxis) -> ScenarioAxis {
    let (name, low, high) = match axis {
        ThemeAxis::Risk => ("Downside exposure", "contained", "severe"),
        ThemeAxis::Urgency => ("Time pressure", "relaxed", "compressed"),
        ThemeAxis::Opportunity => ("Market upside", "muted", "strong"),
        ThemeAxis::Uncertainty => ("Predictability", "stable", "volatile"),
        ThemeAxis::Resources => ("Resource availability", "scarce", "ample"),
        ThemeAxis::StakeholderImpact => ("Stakeholder support", "resistant", "aligned"),
    };
    ScenarioAxis {
        name: name.to_string(),
        low_label: low.to_string(),
        high_label: high.to_string(),
    }
}

fn scenario_grid(ctx: &Ctx) -> ScenarioChart {
    let mut ranked: Vec<(ThemeAxis, f64)> = ctx.themes.axes().collect();
    // stable sort keeps canonical order on ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let x_axis = scenario_axis(ranked[0].0);
    let y_axis = scenario_axis(ranked[1].0);

    let combos = [(false, false), (false, true), (true, false), (true, true)];
    let raw: Vec<f64> = (0..combos.len())
        .map(|i| 0.5 + ctx.unit(&format!("sc:{i}")))
        .collect();
    let raw_total: f64 = raw.iter().sum();
    let mut probabilities: Vec<f64> = raw.iter().map(|r| round3(r / raw_total)).collect();
    if let Some((last, rest)) = probabilities.split_last_mut() {
        *last = round3(1.0 - rest.iter().sum::<f64>());
    }

    let pole = |axis: &ScenarioAxis, high: bool| {
        if high {
            axis.high_label.clone()
        } else {
            axis.low_label.clone()
        }
    };
    let title = if ctx.brief.title.trim().is_empty() {
        "The decision".to_string()
    } else {
        ctx.brief.title.trim().to_string()
    };

    let scenarios = combos
        .iter()
        .zip(probabilities)
        .map(|(&(x_high, y_high), probability)| {
            let xp = pole(&x_axis, x_high);
            let yp = pole(&y_axis, y_high);
            ScenarioCell {
                name: format!(
                    "{} {}, {} {}",
                    xp,
                    x_axis.name.to_lowercase(),
                    yp,
                    y_axis.name.to_lowercase()
                ),
                narrative: format!(
                    "{title} plays out with {} {} and {} {}.",
                    x_axis.name.to_lowercase(),
                    xp,
                    y_axis.name.to_lowercase(),
                    yp
                ),
                x_high,
                y_high,
                probability,
            }
        })
        .collect();

    ScenarioChart {
        x_axis,
        y_axis,
        scenarios,
    }
}

fn theme_radar(ctx: &Ctx) -> ThemeRadarChart {
    let points = ctx
        .themes
        .axes()
        .map(|(axis, value)| RadarPoint {
            axis,
            value: ctx.jittered(value, &format!("radar:{axis}"), 0.05),
        })
        .collect();
    ThemeRadarChart {
        points,
        signal: round3(0.3 + 0.6 * ctx.unit("radar:signal")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognitive::catalog;

    fn brief() -> DecisionBrief {
        DecisionBrief {
            decision_id: "d1".into(),
            title: "Enter the German market".into(),
            statement: "Decide whether to open a Berlin office this year".into(),
            alternatives: vec!["Open office".into(), "Partner with reseller".into(), "Wait".into()],
            stakeholders: vec!["Sales".into(), "Finance".into()],
            criteria: vec!["Revenue".into(), "Time to market".into()],
            constraints: vec!["Hiring freeze".into()],
            assumptions: vec!["Demand mirrors France".into()],
            budget: Some("$400k".into()),
            ..Default::default()
        }
    }

    #[test]
    fn every_framework_gets_expected_kind() {
        let themes = ThemeVector::new(0.5, 0.4, 0.6, 0.5, 0.4, 0.3);
        for f in catalog::catalog() {
            let payload = build_canonical(f.id, &brief(), &themes);
            assert_eq!(payload.kind(), expected_kind(f.id), "{}", f.id);
        }
    }

    #[test]
    fn builders_are_deterministic() {
        let themes = ThemeVector::new(0.5, 0.4, 0.6, 0.5, 0.4, 0.3);
        let a = serde_json::to_string(&build_canonical("monte_carlo", &brief(), &themes)).unwrap();
        let b = serde_json::to_string(&build_canonical("monte_carlo", &brief(), &themes)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn budget_parsing_handles_suffixes() {
        assert_eq!(parse_budget_thousands("$400k"), Some(400.0));
        assert_eq!(parse_budget_thousands("1,200,000 EUR"), Some(1200.0));
        assert_eq!(parse_budget_thousands("2.5M"), Some(2500.0));
        assert_eq!(parse_budget_thousands("tbd"), None);
    }

    #[test]
    fn oversized_budgets_are_capped_or_ignored() {
        assert_eq!(parse_budget_thousands("123456789b"), Some(MAX_BUDGET_THOUSANDS));
        assert_eq!(parse_budget_thousands(&"9".repeat(400)), None);
        assert_eq!(parse_budget_thousands("0"), None);
    }

    #[test]
    fn extreme_budgets_still_yield_a_valid_cost_benefit_chart() {
        let themes = ThemeVector::new(0.5, 0.4, 0.6, 0.5, 0.4, 0.3);
        for budget in ["123456789b".to_string(), "9".repeat(400), "999999999999999999k".to_string()] {
            let brief = DecisionBrief {
                budget: Some(budget.clone()),
                ..brief()
            };
            let payload = build_canonical("cost_benefit", &brief, &themes);
            let report = crate::visuals::validate("cost_benefit", &payload);
            assert!(report.ok, "budget {budget}: {:?}", report.issues);
        }
    }

    #[test]
    fn mandatory_tasks_never_land_in_eliminate() {
        let themes = ThemeVector::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let VisualizationPayload::Eisenhower(chart) = build_canonical("eisenhower", &brief(), &themes)
        else {
            panic!("wrong kind");
        };
        assert!(chart.points.iter().any(|p| p.mandatory));
        for p in chart.points.iter().filter(|p| p.mandatory) {
            assert_ne!(p.quadrant, EisenhowerQuadrant::Eliminate);
        }
    }

    #[test]
    fn pareto_ends_at_one_hundred_percent() {
        let themes = ThemeVector::new(0.5, 0.4, 0.6, 0.5, 0.4, 0.3);
        let VisualizationPayload::Pareto(chart) = build_canonical("pareto", &brief(), &themes) else {
            panic!("wrong kind");
        };
        assert_eq!(chart.items.last().map(|i| i.cumulative_pct), Some(100.0));
        assert!(!chart.vital_few.is_empty());
    }
}
