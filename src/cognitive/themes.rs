//! Theme vectors: the six-axis profile shared by decisions and frameworks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::brief::{DecisionBrief, RiskTolerance};

/// Axis identifiers in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeAxis {
    Risk,
    Urgency,
    Opportunity,
    Uncertainty,
    Resources,
    StakeholderImpact,
}

impl ThemeAxis {
    pub const ALL: [ThemeAxis; 6] = [
        ThemeAxis::Risk,
        ThemeAxis::Urgency,
        ThemeAxis::Opportunity,
        ThemeAxis::Uncertainty,
        ThemeAxis::Resources,
        ThemeAxis::StakeholderImpact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeAxis::Risk => "risk",
            ThemeAxis::Urgency => "urgency",
            ThemeAxis::Opportunity => "opportunity",
            ThemeAxis::Uncertainty => "uncertainty",
            ThemeAxis::Resources => "resources",
            ThemeAxis::StakeholderImpact => "stakeholder_impact",
        }
    }
}

impl fmt::Display for ThemeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Six-axis profile. Every axis is always present, clamped to [0,1] and rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThemeVector {
    pub risk: f64,
    pub urgency: f64,
    pub opportunity: f64,
    pub uncertainty: f64,
    pub resources: f64,
    pub stakeholder_impact: f64,
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn normalize(value: f64) -> f64 {
    round3(clamp_unit(value))
}

impl ThemeVector {
    pub fn new(
        risk: f64,
        urgency: f64,
        opportunity: f64,
        uncertainty: f64,
        resources: f64,
        stakeholder_impact: f64,
    ) -> Self {
        Self {
            risk,
            urgency,
            opportunity,
            uncertainty,
            resources,
            stakeholder_impact,
        }
        .clamped()
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        Self::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        )
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.risk,
            self.urgency,
            self.opportunity,
            self.uncertainty,
            self.resources,
            self.stakeholder_impact,
        ]
    }

    pub fn get(&self, axis: ThemeAxis) -> f64 {
        match axis {
            ThemeAxis::Risk => self.risk,
            ThemeAxis::Urgency => self.urgency,
            ThemeAxis::Opportunity => self.opportunity,
            ThemeAxis::Uncertainty => self.uncertainty,
            ThemeAxis::Resources => self.resources,
            ThemeAxis::StakeholderImpact => self.stakeholder_impact,
        }
    }

    /// Clamp and round every axis independently.
    pub fn clamped(self) -> Self {
        Self {
            risk: normalize(self.risk),
            urgency: normalize(self.urgency),
            opportunity: normalize(self.opportunity),
            uncertainty: normalize(self.uncertainty),
            resources: normalize(self.resources),
            stakeholder_impact: normalize(self.stakeholder_impact),
        }
    }

    pub fn axes(&self) -> impl Iterator<Item = (ThemeAxis, f64)> + '_ {
        ThemeAxis::ALL.iter().map(move |a| (*a, self.get(*a)))
    }

    /// Axis with the highest value; ties resolve to the earliest axis in canonical order.
    pub fn dominant_axis(&self) -> ThemeAxis {
        let mut best = ThemeAxis::Risk;
        let mut best_value = f64::MIN;
        for (axis, value) in self.axes() {
            if value > best_value {
                best = axis;
                best_value = value;
            }
        }
        best
    }

    /// Weighted linear interpolation `a·(1−w) + b·w`.
    ///
    /// Written as a sum of two products so `blend(a, b, 0.5) == blend(b, a, 0.5)` bit for bit.
    pub fn blend(a: &ThemeVector, b: &ThemeVector, weight: f64) -> ThemeVector {
        let w = clamp_unit(weight);
        let aw = 1.0 - w;
        let mix = |x: f64, y: f64| x * aw + y * w;
        ThemeVector {
            risk: mix(a.risk, b.risk),
            urgency: mix(a.urgency, b.urgency),
            opportunity: mix(a.opportunity, b.opportunity),
            uncertainty: mix(a.uncertainty, b.uncertainty),
            resources: mix(a.resources, b.resources),
            stakeholder_impact: mix(a.stakeholder_impact, b.stakeholder_impact),
        }
        .clamped()
    }

    /// Per-axis arithmetic mean; an empty slice yields the zero vector.
    pub fn mean(vectors: &[ThemeVector]) -> ThemeVector {
        if vectors.is_empty() {
            return ThemeVector::default();
        }
        let n = vectors.len() as f64;
        let mut sums = [0.0f64; 6];
        for v in vectors {
            for (slot, value) in sums.iter_mut().zip(v.to_array()) {
                *slot += value;
            }
        }
        ThemeVector::from_array(sums.map(|s| s / n))
    }
}

const BASE: ThemeVector = ThemeVector {
    risk: 0.35,
    urgency: 0.30,
    opportunity: 0.40,
    uncertainty: 0.35,
    resources: 0.30,
    stakeholder_impact: 0.30,
};

const KEYWORD_STEP: f64 = 0.08;
const KEYWORD_CAP: f64 = 0.40;

const RISK_KEYWORDS: &[&str] = &[
    "risk", "threat", "downside", "exposure", "loss", "liability", "failure", "compliance",
    "regulat", "security",
];
const URGENCY_KEYWORDS: &[&str] = &[
    "deadline", "urgent", "asap", "immediately", "this quarter", "time-sensitive", "window",
    "before", "critical",
];
const OPPORTUNITY_KEYWORDS: &[&str] = &[
    "growth", "opportunity", "market", "revenue", "expand", "launch", "upside", "innovation",
    "advantage",
];
const UNCERTAINTY_KEYWORDS: &[&str] = &[
    "uncertain", "unknown", "unclear", "volatile", "assume", "forecast", "maybe", "unproven",
    "speculative",
];
const RESOURCE_KEYWORDS: &[&str] = &[
    "budget", "cost", "headcount", "capacity", "hiring", "funding", "capital", "resource",
    "runway",
];
const STAKEHOLDER_KEYWORDS: &[&str] = &[
    "customer", "team", "employee", "partner", "board", "investor", "stakeholder", "user",
    "community",
];

fn keyword_boost(corpus: &str, keywords: &[&str]) -> f64 {
    let hits = keywords.iter().filter(|k| corpus.contains(*k)).count();
    (hits as f64 * KEYWORD_STEP).min(KEYWORD_CAP)
}

fn capped(count: usize, step: f64, cap: f64) -> f64 {
    (count as f64 * step).min(cap)
}

/// Infer the decision's theme vector from free text and structured fields.
pub fn infer_theme_vector(brief: &DecisionBrief) -> ThemeVector {
    let corpus = brief.corpus();

    let mut v = BASE;
    v.risk += keyword_boost(&corpus, RISK_KEYWORDS);
    v.urgency += keyword_boost(&corpus, URGENCY_KEYWORDS);
    v.opportunity += keyword_boost(&corpus, OPPORTUNITY_KEYWORDS);
    v.uncertainty += keyword_boost(&corpus, UNCERTAINTY_KEYWORDS);
    v.resources += keyword_boost(&corpus, RESOURCE_KEYWORDS);
    v.stakeholder_impact += keyword_boost(&corpus, STAKEHOLDER_KEYWORDS);

    if brief.has_deadline() {
        v.urgency += 0.15;
    }
    if brief.has_budget() {
        v.resources += 0.15;
    }
    v.stakeholder_impact += capped(brief.stakeholders.len(), 0.05, 0.25);
    v.opportunity += capped(brief.criteria.len(), 0.03, 0.12);
    v.resources += capped(brief.constraints.len(), 0.04, 0.20);
    v.uncertainty += capped(brief.assumptions.len(), 0.04, 0.20);
    v.uncertainty += capped(brief.distinct_alternatives().len().saturating_sub(2), 0.03, 0.09);
    if brief.risk_tolerance == RiskTolerance::Low {
        v.risk += 0.10;
    }

    v.clamped()
}
