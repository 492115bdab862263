//! Field deserializers that never fail on a type mismatch.
//!
//! Each helper deserializes the raw JSON value first and then interprets it, so a wrong type
//! becomes an absent field instead of aborting the surrounding record. The same helpers back
//! the engine's query types, which accept the same loosely typed input.

use casematch_types::NonEmptyText;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Upper bound for a plausible patient age. Anything above is treated as a data-entry error.
const MAX_PLAUSIBLE_AGE: f64 = 150.0;

/// Trimmed non-blank text. Anything else is `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

/// Like [`text`], with absence as the empty string.
pub fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(deserializer)?.unwrap_or_default())
}

/// Any value `T` accepts, or `T::default()` for `null` and mistyped input.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Identifiers arrive as strings from some sources and as integers from others.
pub(crate) fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => Some(n.to_string()),
        other => text_from_value(other),
    })
}

/// A list of names, or a single comma-separated string.
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(text_from_value).collect(),
        Value::String(joined) => joined
            .split(',')
            .filter_map(|part| NonEmptyText::new(part).ok())
            .map(NonEmptyText::into_string)
            .collect(),
        _ => Vec::new(),
    })
}

/// Whole years from a number or a numeric string (a trailing `세` is allowed).
pub fn age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('세').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw
        .filter(|age| age.is_finite() && (0.0..=MAX_PLAUSIBLE_AGE).contains(age))
        .map(|age| age.round() as u32))
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => NonEmptyText::new(s).ok().map(NonEmptyText::into_string),
        _ => None,
    }
}
