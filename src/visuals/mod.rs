//! Visualization payloads: a closed set of chart shapes, one per deep-tier framework
//! plus a theme radar for everything else.
//!
//! Each variant has a canonical builder (`builders`) and a weighted rubric (`rubric`).

pub mod builders;
pub mod rubric;

use serde::{Deserialize, Serialize};

use crate::cognitive::themes::ThemeAxis;

pub use builders::build_canonical;
pub use rubric::{PASS_THRESHOLD, RubricReport, ensure_valid, repair, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualizationPayload {
    Swot(SwotChart),
    Eisenhower(EisenhowerChart),
    BcgMatrix(BcgChart),
    MonteCarlo(MonteCarloChart),
    DecisionMatrix(DecisionMatrixChart),
    Pareto(ParetoChart),
    RiskMatrix(RiskMatrixChart),
    FiveForces(FiveForcesChart),
    Pestle(PestleChart),
    CostBenefit(CostBenefitChart),
    StakeholderMap(StakeholderChart),
    ScenarioGrid(ScenarioChart),
    ThemeRadar(ThemeRadarChart),
}

impl VisualizationPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            VisualizationPayload::Swot(_) => "swot",
            VisualizationPayload::Eisenhower(_) => "eisenhower",
            VisualizationPayload::BcgMatrix(_) => "bcg_matrix",
            VisualizationPayload::MonteCarlo(_) => "monte_carlo",
            VisualizationPayload::DecisionMatrix(_) => "decision_matrix",
            VisualizationPayload::Pareto(_) => "pareto",
            VisualizationPayload::RiskMatrix(_) => "risk_matrix",
            VisualizationPayload::FiveForces(_) => "five_forces",
            VisualizationPayload::Pestle(_) => "pestle",
            VisualizationPayload::CostBenefit(_) => "cost_benefit",
            VisualizationPayload::StakeholderMap(_) => "stakeholder_map",
            VisualizationPayload::ScenarioGrid(_) => "scenario_grid",
            VisualizationPayload::ThemeRadar(_) => "theme_radar",
        }
    }
}

/// Chart kind a framework must produce. Frameworks without a canonical contract get a radar.
pub fn expected_kind(framework_id: &str) -> &'static str {
    match framework_id {
        "swot" => "swot",
        "eisenhower" => "eisenhower",
        "bcg_matrix" => "bcg_matrix",
        "monte_carlo" => "monte_carlo",
        "decision_matrix" => "decision_matrix",
        "pareto" => "pareto",
        "risk_matrix" => "risk_matrix",
        "porters_five_forces" => "five_forces",
        "pestle" => "pestle",
        "cost_benefit" => "cost_benefit",
        "stakeholder_map" => "stakeholder_map",
        "scenario_planning" => "scenario_grid",
        _ => "theme_radar",
    }
}

// ---------------------------------------------------------------------------
// SWOT

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotItem {
    pub label: String,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwotChart {
    pub strengths: Vec<SwotItem>,
    pub weaknesses: Vec<SwotItem>,
    pub opportunities: Vec<SwotItem>,
    pub threats: Vec<SwotItem>,
}

impl SwotChart {
    pub fn quadrants(&self) -> [&Vec<SwotItem>; 4] {
        [
            &self.strengths,
            &self.weaknesses,
            &self.opportunities,
            &self.threats,
        ]
    }
}

// ---------------------------------------------------------------------------
// Eisenhower

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EisenhowerQuadrant {
    DoFirst,
    Schedule,
    Delegate,
    Eliminate,
}

impl EisenhowerQuadrant {
    pub fn classify(urgency: f64, importance: f64, threshold: f64) -> Self {
        match (urgency >= threshold, importance >= threshold) {
            (true, true) => EisenhowerQuadrant::DoFirst,
            (false, true) => EisenhowerQuadrant::Schedule,
            (true, false) => EisenhowerQuadrant::Delegate,
            (false, false) => EisenhowerQuadrant::Eliminate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EisenhowerPoint {
    pub label: String,
    pub urgency: f64,
    pub importance: f64,
    pub quadrant: EisenhowerQuadrant,
    #[serde(default)]
    pub mandatory: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EisenhowerCounts {
    pub do_first: u32,
    pub schedule: u32,
    pub delegate: u32,
    pub eliminate: u32,
}

impl EisenhowerCounts {
    pub fn tally(points: &[EisenhowerPoint]) -> Self {
        let mut counts = Self::default();
        for p in points {
            match p.quadrant {
                EisenhowerQuadrant::DoFirst => counts.do_first += 1,
                EisenhowerQuadrant::Schedule => counts.schedule += 1,
                EisenhowerQuadrant::Delegate => counts.delegate += 1,
                EisenhowerQuadrant::Eliminate => counts.eliminate += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EisenhowerChart {
    pub threshold: f64,
    pub points: Vec<EisenhowerPoint>,
    pub counts: EisenhowerCounts,
}

// ---------------------------------------------------------------------------
// BCG growth-share

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcgQuadrant {
    Star,
    CashCow,
    QuestionMark,
    Dog,
}

impl BcgQuadrant {
    pub fn classify(growth: f64, share: f64, growth_threshold: f64, share_threshold: f64) -> Self {
        match (growth >= growth_threshold, share >= share_threshold) {
            (true, true) => BcgQuadrant::Star,
            (false, true) => BcgQuadrant::CashCow,
            (true, false) => BcgQuadrant::QuestionMark,
            (false, false) => BcgQuadrant::Dog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcgItem {
    pub label: String,
    pub market_growth: f64,
    pub relative_share: f64,
    pub quadrant: BcgQuadrant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BcgChart {
    pub growth_threshold: f64,
    pub share_threshold: f64,
    pub items: Vec<BcgItem>,
}

// ---------------------------------------------------------------------------
// Monte Carlo

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloChart {
    pub metric: String,
    pub trials: u32,
    pub bins: Vec<HistogramBin>,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub mean: f64,
}

// ---------------------------------------------------------------------------
// Weighted decision matrix

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRow {
    pub option: String,
    /// One score in [0,10] per criterion, same order as `criteria`
    pub scores: Vec<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrixChart {
    pub criteria: Vec<CriterionWeight>,
    pub options: Vec<OptionRow>,
    pub ranking: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pareto

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoItem {
    pub label: String,
    pub value: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoChart {
    pub cutoff_pct: f64,
    pub items: Vec<ParetoItem>,
    pub vital_few: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk probability-impact

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn classify(probability: f64, impact: f64) -> Self {
        let exposure = probability * impact;
        if exposure >= 0.56 {
            RiskLevel::Critical
        } else if exposure >= 0.36 {
            RiskLevel::High
        } else if exposure >= 0.16 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    pub label: String,
    pub probability: f64,
    pub impact: f64,
    pub level: RiskLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevelCounts {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl RiskLevelCounts {
    pub fn tally(risks: &[RiskPoint]) -> Self {
        let mut counts = Self::default();
        for r in risks {
            match r.level {
                RiskLevel::Low => counts.low += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::High => counts.high += 1,
                RiskLevel::Critical => counts.critical += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrixChart {
    pub risks: Vec<RiskPoint>,
    pub counts: RiskLevelCounts,
}

// ---------------------------------------------------------------------------
// Porter's five forces

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitiveForce {
    Rivalry,
    NewEntrants,
    Substitutes,
    BuyerPower,
    SupplierPower,
}

impl CompetitiveForce {
    pub const ALL: [CompetitiveForce; 5] = [
        CompetitiveForce::Rivalry,
        CompetitiveForce::NewEntrants,
        CompetitiveForce::Substitutes,
        CompetitiveForce::BuyerPower,
        CompetitiveForce::SupplierPower,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceScore {
    pub force: CompetitiveForce,
    pub intensity: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveForcesChart {
    pub forces: Vec<ForceScore>,
    pub overall_intensity: f64,
}

// ---------------------------------------------------------------------------
// PESTLE

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PestleDimension {
    Political,
    Economic,
    Social,
    Technological,
    Legal,
    Environmental,
}

impl PestleDimension {
    pub const ALL: [PestleDimension; 6] = [
        PestleDimension::Political,
        PestleDimension::Economic,
        PestleDimension::Social,
        PestleDimension::Technological,
        PestleDimension::Legal,
        PestleDimension::Environmental,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestleFactor {
    pub dimension: PestleDimension,
    pub impact: f64,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestleChart {
    pub factors: Vec<PestleFactor>,
}

// ---------------------------------------------------------------------------
// Cost-benefit

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBenefitChart {
    pub unit: String,
    pub costs: Vec<LineItem>,
    pub benefits: Vec<LineItem>,
    pub total_cost: f64,
    pub total_benefit: f64,
    pub net_value: f64,
    pub benefit_cost_ratio: f64,
}

// ---------------------------------------------------------------------------
// Stakeholder power-interest

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderQuadrant {
    ManageClosely,
    KeepSatisfied,
    KeepInformed,
    Monitor,
}

impl StakeholderQuadrant {
    pub fn classify(power: f64, interest: f64, threshold: f64) -> Self {
        match (power >= threshold, interest >= threshold) {
            (true, true) => StakeholderQuadrant::ManageClosely,
            (true, false) => StakeholderQuadrant::KeepSatisfied,
            (false, true) => StakeholderQuadrant::KeepInformed,
            (false, false) => StakeholderQuadrant::Monitor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderPoint {
    pub name: String,
    pub power: f64,
    pub interest: f64,
    pub quadrant: StakeholderQuadrant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderChart {
    pub threshold: f64,
    pub stakeholders: Vec<StakeholderPoint>,
}

// ---------------------------------------------------------------------------
// Scenario grid

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAxis {
    pub name: String,
    pub low_label: String,
    pub high_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCell {
    pub name: String,
    pub x_high: bool,
    pub y_high: bool,
    pub probability: f64,
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioChart {
    pub x_axis: ScenarioAxis,
    pub y_axis: ScenarioAxis,
    pub scenarios: Vec<ScenarioCell>,
}

// ---------------------------------------------------------------------------
// Theme radar

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub axis: ThemeAxis,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeRadarChart {
    pub points: Vec<RadarPoint>,
    /// Seeded signal strength shown alongside the radar
    pub signal: f64,
}
