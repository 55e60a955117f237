//! Cross-framework relationship graph built from result theme vectors.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::cognitive::themes::{ThemeAxis, ThemeVector, clamp_unit, round3};
use crate::cognitive::types::FrameworkResult;
use crate::utils::theme_similarity;

pub const CONSENSUS_THRESHOLD: f64 = 0.82;
pub const CONFLICT_THRESHOLD: f64 = 0.56;
/// Related pairs below this similarity are noise and never become edges
pub const RELATED_CUTOFF: f64 = 0.70;
pub const MAX_EDGES: usize = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Consensus,
    Conflict,
    Related,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Consensus => "consensus",
            Relation::Conflict => "conflict",
            Relation::Related => "related",
        }
    }

    /// `None` for related pairs under the cutoff.
    pub fn classify(similarity: f64) -> Option<Self> {
        if similarity >= CONSENSUS_THRESHOLD {
            Some(Relation::Consensus)
        } else if similarity <= CONFLICT_THRESHOLD {
            Some(Relation::Conflict)
        } else if similarity >= RELATED_CUTOFF {
            Some(Relation::Related)
        } else {
            None
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub framework_id: String,
    pub name: String,
    pub category: String,
    pub applicability_score: f64,
    pub confidence: f64,
    pub themes: ThemeVector,
    pub dominant_axis: ThemeAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEdge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
    pub similarity: f64,
    pub weight: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropagatedMap {
    pub nodes: Vec<MapNode>,
    pub edges: Vec<MapEdge>,
    pub consensus: Vec<MapEdge>,
    pub conflicts: Vec<MapEdge>,
    pub clusters: BTreeMap<String, Vec<String>>,
}

fn rationale(relation: Relation, a: &MapNode, b: &MapNode, similarity: f64) -> String {
    let verb = match relation {
        Relation::Consensus => "agree",
        Relation::Conflict => "pull in different directions",
        Relation::Related => "overlap",
    };
    format!(
        "{} (led by {}) and {} (led by {}) {} at similarity {:.2}",
        a.name, a.dominant_axis, b.name, b.dominant_axis, verb, similarity
    )
}

fn edge_order(a: &MapEdge, b: &MapEdge) -> Ordering {
    b.weight
        .total_cmp(&a.weight)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.target.cmp(&b.target))
}

/// Build the full graph for one run's results. Input order does not matter.
pub fn build_propagated_map(results: &[FrameworkResult]) -> PropagatedMap {
    let mut sorted: Vec<&FrameworkResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.framework_id.cmp(&b.framework_id));
    sorted.dedup_by(|a, b| a.framework_id == b.framework_id);

    let nodes: Vec<MapNode> = sorted
        .iter()
        .map(|r| MapNode {
            framework_id: r.framework_id.clone(),
            name: r.framework_name.clone(),
            category: r.category.clone(),
            applicability_score: r.applicability_score,
            confidence: r.confidence,
            themes: r.themes,
            dominant_axis: r.themes.dominant_axis(),
        })
        .collect();

    let mut edges = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let similarity = round3(theme_similarity(&a.themes, &b.themes));
            let Some(relation) = Relation::classify(similarity) else {
                continue;
            };
            let weight = match relation {
                Relation::Conflict => 1.0 - similarity,
                _ => similarity,
            };
            // nodes are id-sorted, so `a` is always the smaller id
            edges.push(MapEdge {
                source: a.framework_id.clone(),
                target: b.framework_id.clone(),
                relation,
                similarity,
                weight: round3(clamp_unit(weight)),
                rationale: rationale(relation, a, b, similarity),
            });
        }
    }
    edges.sort_by(edge_order);
    edges.truncate(MAX_EDGES);

    let pick = |relation: Relation| -> Vec<MapEdge> {
        edges
            .iter()
            .filter(|e| e.relation == relation)
            .cloned()
            .collect()
    };
    let consensus = pick(Relation::Consensus);
    let conflicts = pick(Relation::Conflict);

    let mut clusters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for n in &nodes {
        clusters
            .entry(n.category.clone())
            .or_default()
            .push(n.framework_id.clone());
    }

    PropagatedMap {
        nodes,
        edges,
        consensus,
        conflicts,
        clusters,
    }
}
