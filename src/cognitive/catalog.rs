//! Static framework catalog.

use once_cell::sync::Lazy;
use serde::Serialize;

use super::themes::ThemeVector;

/// One analytical framework the engine knows how to apply.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    /// Which themes the framework is sensitive to
    pub weights: ThemeVector,
    /// Deep-tier frameworks get generation-backed analysis and a canonical visualization
    pub deep_tier: bool,
    /// One-line description of what the framework examines
    pub focus: &'static str,
}

type Entry = (&'static str, &'static str, &'static str, [f64; 6], bool, &'static str);

// weights: risk, urgency, opportunity, uncertainty, resources, stakeholder_impact
const ENTRIES: &[Entry] = &[
    ("swot", "SWOT Analysis", "strategic", [0.6, 0.3, 0.8, 0.4, 0.4, 0.4], true,
     "internal strengths and weaknesses against external opportunities and threats"),
    ("eisenhower", "Eisenhower Matrix", "prioritization", [0.3, 0.95, 0.3, 0.2, 0.5, 0.3], true,
     "urgency versus importance of the work the decision creates"),
    ("bcg_matrix", "BCG Growth-Share Matrix", "portfolio", [0.4, 0.2, 0.9, 0.4, 0.6, 0.2], true,
     "market growth against relative share for each initiative"),
    ("monte_carlo", "Monte Carlo Simulation", "quantitative", [0.8, 0.2, 0.4, 0.95, 0.4, 0.1], true,
     "the spread of plausible outcomes under uncertain inputs"),
    ("decision_matrix", "Weighted Decision Matrix", "evaluation", [0.4, 0.4, 0.6, 0.4, 0.5, 0.5], true,
     "how each option scores against weighted criteria"),
    ("pareto", "Pareto Analysis", "prioritization", [0.3, 0.6, 0.5, 0.2, 0.8, 0.2], true,
     "the vital few drivers that produce most of the effect"),
    ("risk_matrix", "Risk Probability-Impact Matrix", "risk", [0.95, 0.4, 0.2, 0.7, 0.3, 0.3], true,
     "likelihood against impact for each identified risk"),
    ("porters_five_forces", "Porter's Five Forces", "market", [0.6, 0.2, 0.8, 0.5, 0.3, 0.4], true,
     "competitive pressure from rivals, entrants, substitutes, buyers and suppliers"),
    ("pestle", "PESTLE Analysis", "environment", [0.6, 0.2, 0.5, 0.8, 0.2, 0.6], true,
     "political, economic, social, technological, legal and environmental forces"),
    ("cost_benefit", "Cost-Benefit Analysis", "financial", [0.4, 0.3, 0.6, 0.3, 0.95, 0.3], true,
     "quantified costs against quantified benefits"),
    ("stakeholder_map", "Stakeholder Power-Interest Grid", "organizational", [0.3, 0.3, 0.3, 0.3, 0.2, 0.95], true,
     "who holds power over the decision and who cares about it"),
    ("scenario_planning", "Scenario Planning", "foresight", [0.6, 0.2, 0.5, 0.95, 0.3, 0.4], true,
     "how the decision holds up across divergent futures"),
    ("ooda", "OODA Loop", "tactical", [0.4, 0.9, 0.4, 0.6, 0.3, 0.2], false,
     "the speed of the observe-orient-decide-act cycle"),
    ("first_principles", "First Principles", "reasoning", [0.3, 0.2, 0.7, 0.6, 0.4, 0.1], false,
     "the fundamental truths beneath the stated problem"),
    ("five_whys", "Five Whys", "root_cause", [0.5, 0.4, 0.2, 0.5, 0.2, 0.2], false,
     "the causal chain behind the presenting problem"),
    ("fishbone", "Ishikawa Fishbone", "root_cause", [0.6, 0.3, 0.2, 0.5, 0.4, 0.3], false,
     "contributing causes grouped by category"),
    ("pre_mortem", "Pre-Mortem", "risk", [0.9, 0.3, 0.2, 0.7, 0.3, 0.4], false,
     "the most likely stories of how this decision fails"),
    ("second_order", "Second-Order Thinking", "systems", [0.6, 0.2, 0.5, 0.7, 0.3, 0.5], false,
     "the consequences of the consequences"),
    ("inversion", "Inversion", "reasoning", [0.8, 0.2, 0.3, 0.5, 0.2, 0.2], false,
     "what would guarantee a bad outcome"),
    ("okr", "OKR Alignment", "execution", [0.2, 0.5, 0.7, 0.2, 0.6, 0.6], false,
     "alignment between the decision and measurable objectives"),
    ("raci", "RACI Matrix", "organizational", [0.2, 0.4, 0.2, 0.2, 0.5, 0.9], false,
     "who is responsible, accountable, consulted and informed"),
    ("moscow", "MoSCoW Prioritization", "prioritization", [0.3, 0.8, 0.4, 0.2, 0.7, 0.5], false,
     "must, should, could and won't scope boundaries"),
    ("rice", "RICE Scoring", "prioritization", [0.3, 0.5, 0.8, 0.4, 0.7, 0.4], false,
     "reach, impact, confidence and effort"),
    ("ice", "ICE Scoring", "prioritization", [0.3, 0.5, 0.8, 0.5, 0.5, 0.2], false,
     "impact, confidence and ease"),
    ("kano", "Kano Model", "product", [0.2, 0.3, 0.8, 0.4, 0.3, 0.8], false,
     "which features delight, satisfy or merely meet expectations"),
    ("jobs_to_be_done", "Jobs To Be Done", "product", [0.2, 0.2, 0.8, 0.5, 0.2, 0.8], false,
     "the progress customers are trying to make"),
    ("value_proposition", "Value Proposition Canvas", "product", [0.2, 0.2, 0.9, 0.3, 0.3, 0.7], false,
     "fit between customer pains, gains and the offer"),
    ("business_model_canvas", "Business Model Canvas", "strategic", [0.4, 0.2, 0.8, 0.4, 0.6, 0.5], false,
     "how value is created, delivered and captured"),
    ("blue_ocean", "Blue Ocean Strategy", "market", [0.5, 0.2, 0.95, 0.6, 0.3, 0.3], false,
     "uncontested market space and value innovation"),
    ("ansoff", "Ansoff Matrix", "market", [0.6, 0.2, 0.9, 0.5, 0.4, 0.2], false,
     "growth through markets and products, new or existing"),
    ("mckinsey_7s", "McKinsey 7-S", "organizational", [0.3, 0.2, 0.4, 0.3, 0.6, 0.8], false,
     "alignment of strategy, structure, systems and people"),
    ("balanced_scorecard", "Balanced Scorecard", "execution", [0.3, 0.3, 0.6, 0.2, 0.6, 0.7], false,
     "financial, customer, process and learning perspectives"),
    ("real_options", "Real Options Analysis", "financial", [0.6, 0.3, 0.7, 0.9, 0.6, 0.1], false,
     "the value of keeping future choices open"),
    ("npv", "Net Present Value", "financial", [0.5, 0.2, 0.6, 0.4, 0.9, 0.1], false,
     "discounted value of future cash flows"),
    ("break_even", "Break-Even Analysis", "financial", [0.5, 0.3, 0.5, 0.3, 0.9, 0.1], false,
     "the volume at which the decision pays for itself"),
    ("sensitivity", "Sensitivity Analysis", "quantitative", [0.7, 0.2, 0.4, 0.9, 0.5, 0.1], false,
     "which inputs swing the outcome the most"),
    ("decision_tree", "Decision Tree", "quantitative", [0.7, 0.3, 0.5, 0.8, 0.4, 0.2], false,
     "sequential choices and chance events with their payoffs"),
    ("expected_value", "Expected Value", "quantitative", [0.7, 0.2, 0.6, 0.8, 0.5, 0.1], false,
     "probability-weighted payoffs across outcomes"),
    ("regret_minimization", "Regret Minimization", "reasoning", [0.6, 0.3, 0.6, 0.7, 0.2, 0.4], false,
     "which choice you are least likely to regret later"),
    ("six_hats", "Six Thinking Hats", "creative", [0.4, 0.2, 0.5, 0.4, 0.2, 0.7], false,
     "facts, feelings, caution, benefits, creativity and process"),
    ("lateral", "Lateral Thinking", "creative", [0.2, 0.2, 0.8, 0.6, 0.2, 0.3], false,
     "unconventional reframings of the problem"),
    ("dialectical", "Dialectical Inquiry", "reasoning", [0.5, 0.2, 0.4, 0.6, 0.2, 0.6], false,
     "thesis, antithesis and the synthesis between them"),
    ("systems_map", "Systems Mapping", "systems", [0.5, 0.2, 0.5, 0.7, 0.4, 0.6], false,
     "feedback loops and delays around the decision"),
    ("force_field", "Force Field Analysis", "change", [0.4, 0.3, 0.5, 0.4, 0.4, 0.8], false,
     "driving forces against restraining forces"),
    ("kotter", "Kotter's 8 Steps", "change", [0.3, 0.6, 0.4, 0.3, 0.4, 0.9], false,
     "the sequence for leading organizational change"),
    ("cynefin", "Cynefin Framework", "sensemaking", [0.6, 0.4, 0.3, 0.9, 0.2, 0.3], false,
     "whether the situation is clear, complicated, complex or chaotic"),
    ("tows", "TOWS Matrix", "strategic", [0.6, 0.3, 0.8, 0.4, 0.4, 0.3], false,
     "strategies pairing internal factors with external ones"),
    ("value_chain", "Value Chain Analysis", "operations", [0.3, 0.2, 0.6, 0.2, 0.8, 0.3], false,
     "where in the chain of activities value is added"),
    ("lean_canvas", "Lean Canvas", "product", [0.5, 0.4, 0.8, 0.7, 0.6, 0.4], false,
     "problem, solution, key metrics and unfair advantage"),
    ("delphi", "Delphi Method", "foresight", [0.4, 0.1, 0.3, 0.9, 0.2, 0.7], false,
     "converging expert judgement over several rounds"),
];

static CATALOG: Lazy<Vec<FrameworkDefinition>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|&(id, name, category, weights, deep_tier, focus)| FrameworkDefinition {
            id,
            name,
            category,
            weights: ThemeVector::from_array(weights),
            deep_tier,
            focus,
        })
        .collect()
});

/// Every framework in catalog order.
pub fn catalog() -> &'static [FrameworkDefinition] {
    CATALOG.as_slice()
}

pub fn find(framework_id: &str) -> Option<&'static FrameworkDefinition> {
    CATALOG.iter().find(|f| f.id == framework_id)
}

pub fn deep_tier() -> impl Iterator<Item = &'static FrameworkDefinition> {
    CATALOG.iter().filter(|f| f.deep_tier)
}

pub fn all_ids() -> Vec<String> {
    CATALOG.iter().map(|f| f.id.to_string()).collect()
}
