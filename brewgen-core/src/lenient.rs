//! Forgiving deserializers for model-authored JSON.
//!
//! The draft recipe comes from an LLM, which is inconsistent about whether a
//! number is quoted, whether a missing value is `null` or absent, and so on.
//! These helpers accept whatever shape is reasonable and fall back to a
//! neutral value instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number, bool or null and return it as a string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Like [`string`] but keeps "absent" distinct from "empty".
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Accept a number or a numeric string ("5.5", "5,5 %", "60 min").
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(s)) => crate::units::leading_number(&s),
        _ => None,
    })
}

/// Whole days, rounded and clamped at zero.
pub fn opt_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let negative = s.trim_start().starts_with('-');
            crate::units::leading_number(&s).map(|v| if negative { -v } else { v })
        }
        _ => None,
    };
    Ok(number
        .filter(|v| v.is_finite())
        .map(|v| v.round().max(0.0) as u32))
}

/// Any value that fails to deserialize (including `null`) becomes the default.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// A list that tolerates `null` and a single bare item.
pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => serde_json::from_value(single).map(|t| vec![t]).unwrap_or_default(),
    })
}
