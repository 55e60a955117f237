use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Output contract for one framework analysis.
pub fn framework_analysis_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "applicability_score": {"type": "number", "minimum": 0.0, "maximum": 1.0},
            "confidence": {"type": "number", "minimum": 0.0, "maximum": 1.0},
            "insights": {"type": "array", "items": {"type": "string"}, "minItems": 1, "maxItems": 8},
            "actions": {"type": "array", "items": {"type": "string"}, "maxItems": 8},
            "risks": {"type": "array", "items": {"type": "string"}, "maxItems": 8},
            "assumptions": {"type": "array", "items": {"type": "string"}, "maxItems": 8}
        },
        "required": ["applicability_score", "confidence", "insights", "actions", "risks"],
        "additionalProperties": true
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_scores_and_lists() {
        let schema = framework_analysis_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"applicability_score"));
        assert!(required.contains(&"insights"));
    }
}
