//! Decision brief: the structured input every run analyzes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stated appetite for downside risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

#[allow(clippy::should_implement_trait)]
impl RiskTolerance {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" | "averse" | "conservative" => RiskTolerance::Low,
            "high" | "seeking" | "aggressive" => RiskTolerance::High,
            _ => RiskTolerance::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured decision brief produced upstream (authoring and clarification live outside this crate)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionBrief {
    pub decision_id: String,
    pub title: String,
    pub statement: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

impl DecisionBrief {
    /// Lowercased concatenation of every free-text field, used for keyword scans.
    pub fn corpus(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.title, &self.statement, &self.context];
        parts.extend(self.alternatives.iter().map(String::as_str));
        parts.extend(self.constraints.iter().map(String::as_str));
        parts.extend(self.assumptions.iter().map(String::as_str));
        parts.extend(self.criteria.iter().map(String::as_str));
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Alternatives with blanks and case-insensitive duplicates removed, order preserved.
    pub fn distinct_alternatives(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.alternatives
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .filter(|a| seen.insert(a.to_lowercase()))
            .map(str::to_string)
            .collect()
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    pub fn has_budget(&self) -> bool {
        self.budget.as_deref().is_some_and(|b| !b.trim().is_empty())
    }

    /// Options to compare: the stated alternatives, or three archetypes when fewer than two are given.
    pub fn candidate_options(&self) -> Vec<String> {
        let alternatives = self.distinct_alternatives();
        if alternatives.len() >= 2 {
            alternatives
        } else {
            ARCHETYPE_OPTIONS.iter().map(|s| s.to_string()).collect()
        }
    }
}

/// Stand-in options when a brief names fewer than two alternatives
pub const ARCHETYPE_OPTIONS: [&str; 3] = [
    "Conservative path",
    "Phased rollout",
    "Aggressive commitment",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tolerance_parses_loosely() {
        assert_eq!(RiskTolerance::from_str("LOW"), RiskTolerance::Low);
        assert_eq!(RiskTolerance::from_str("aggressive"), RiskTolerance::High);
        assert_eq!(RiskTolerance::from_str("whatever"), RiskTolerance::Medium);
    }

    #[test]
    fn distinct_alternatives_drops_blanks_and_duplicates() {
        let brief = DecisionBrief {
            alternatives: vec![
                "Full launch".into(),
                "  ".into(),
                "full launch".into(),
                "Delay".into(),
            ],
            ..Default::default()
        };
        assert_eq!(brief.distinct_alternatives(), vec!["Full launch", "Delay"]);
        assert_eq!(brief.candidate_options(), vec!["Full launch", "Delay"]);
    }

    #[test]
    fn single_alternative_falls_back_to_archetypes() {
        let brief = DecisionBrief {
            alternatives: vec!["Go".into()],
            ..Default::default()
        };
        assert_eq!(brief.candidate_options(), ARCHETYPE_OPTIONS.to_vec());
    }

    #[test]
    fn brief_deserializes_with_defaults() {
        let brief: DecisionBrief = serde_json::from_str(
            r#"{"decision_id":"d1","title":"Expand","statement":"Should we expand?","risk_tolerance":"high"}"#,
        )
        .unwrap();
        assert_eq!(brief.risk_tolerance, RiskTolerance::High);
        assert!(brief.alternatives.is_empty());
        assert!(!brief.has_deadline());
    }
}
