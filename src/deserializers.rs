//! Forgiving deserializers for generated framework analyses.
//!
//! Models drift from the requested schema in predictable ways: scores come back as
//! strings or percentages and list fields come back as a single string. These
//! deserializers accept those shapes while still rejecting values that cannot be
//! interpreted, which surfaces as `ModelOutputInvalid`.

use serde::{Deserialize, Deserializer};

/// Deserializes a unit-interval score.
///
/// # Accepted Formats
///
/// * **Numeric**: `0.72`
/// * **Percentage**: `"72%"` or a bare whole number in 2..=100 (`72`) → 0.72
/// * **String numeric**: `"0.72"`
/// * **String presets** (case-insensitive): `"low"` → 0.25, `"medium"` → 0.5, `"high"` → 0.8
///
/// # Errors
///
/// Returns an error for non-finite values, negatives, percentages above 100%,
/// fractional overshoots like `1.5`, or unparseable strings.
pub fn de_score_forgiving<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let out_of_range = |raw: f64| D::Error::custom(format!("score out of range: {}", raw));
    let v = serde_json::Value::deserialize(deserializer)?;
    let raw = match v {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("invalid numeric score"))?,
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.to_lowercase().as_str() {
                "low" => return Ok(0.25),
                "medium" => return Ok(0.5),
                "high" => return Ok(0.8),
                _ => {
                    let (num, pct) = match s.strip_suffix('%') {
                        Some(stripped) => (stripped.trim(), true),
                        None => (s, false),
                    };
                    let parsed: f64 = num.parse().map_err(|_| {
                        D::Error::custom(format!(
                            "Invalid score '{}'. Use a number in 0.0-1.0, a percentage, or low/medium/high",
                            s
                        ))
                    })?;
                    if pct {
                        if !parsed.is_finite() || !(0.0..=100.0).contains(&parsed) {
                            return Err(out_of_range(parsed));
                        }
                        return Ok(parsed / 100.0);
                    }
                    parsed
                }
            }
        }
        other => return Err(D::Error::custom(format!("invalid type for score: {}", other))),
    };

    if !raw.is_finite() || raw < 0.0 {
        return Err(out_of_range(raw));
    }
    if raw <= 1.0 {
        Ok(raw)
    } else if raw <= 100.0 && raw.fract() == 0.0 {
        Ok(raw / 100.0)
    } else {
        Err(out_of_range(raw))
    }
}

/// Deserializes a list of short strings.
///
/// # Accepted Formats
///
/// * **Null / missing**: `[]`
/// * **String**: `"one item"` → `["one item"]`
/// * **Array**: strings are kept, objects contribute their `text`/`title`/`description`
///   field, other scalars are stringified
///
/// Blank entries are dropped.
pub fn de_string_list_forgiving<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(v) = opt else { return Ok(Vec::new()) };
    let items = match v {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(s) => vec![s],
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .filter_map(|el| match el {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Object(map) => ["text", "title", "description"]
                    .iter()
                    .find_map(|k| map.get(*k).and_then(|x| x.as_str()).map(str::to_string)),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        other => {
            return Err(D::Error::custom(format!(
                "invalid type for string list: {}",
                other
            )));
        }
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
