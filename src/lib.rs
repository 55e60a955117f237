pub mod analyzer;
pub mod brief;
pub mod clients;
pub mod cognitive;
pub mod config;
pub mod deserializers;
pub mod error;
pub mod propagation;
pub mod runs;
pub mod schemas;
pub mod synthesis;
pub mod utils;
pub mod visuals;

pub use brief::{DecisionBrief, RiskTolerance};
pub use error::{AnalysisError, Result};

/// Parse a brief from JSON, or TOML when `is_toml` is set.
pub fn parse_brief(content: &str, is_toml: bool) -> Result<DecisionBrief> {
    if is_toml {
        Ok(toml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}
