//! Canonical JSON snapshots.
//!
//! Values are serialized with object keys sorted, so two snapshots compare
//! equal exactly when their canonical text does. When they differ,
//! [`first_divergence`] names the JSON path where they part ways.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Canonical pretty JSON with sorted object keys and a trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = canonical_value(value)?;
    let mut text = serde_json::to_string_pretty(&value).context("Failed to format snapshot")?;
    text.push('\n');
    Ok(text)
}

/// Serialize `value` and sort every object's keys.
pub fn canonical_value<T: Serialize>(value: &T) -> Result<Value> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot")?;
    Ok(sort_keys(value))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key, sort_keys(inner)))
                    .collect(),
            )
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// JSON path (`$.herds[2].x` style) of the first place `a` and `b` differ,
/// or `None` when they are equal.
pub fn first_divergence(a: &Value, b: &Value) -> Option<String> {
    divergence_at(a, b, "$".to_string())
}

fn divergence_at(a: &Value, b: &Value, path: String) -> Option<String> {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
            keys.sort();
            keys.dedup();
            keys.into_iter().find_map(|key| match (left.get(key), right.get(key)) {
                (Some(l), Some(r)) => divergence_at(l, r, format!("{path}.{key}")),
                _ => Some(format!("{path}.{key}")),
            })
        }
        (Value::Array(left), Value::Array(right)) => {
            let shared = left.iter().zip(right).enumerate().find_map(|(index, (l, r))| {
                divergence_at(l, r, format!("{path}[{index}]"))
            });
            match shared {
                Some(found) => Some(found),
                None if left.len() != right.len() => {
                    Some(format!("{path}[{}]", left.len().min(right.len())))
                }
                None => None,
            }
        }
        _ if a == b => None,
        _ => Some(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_sorts_keys() {
        let a = canonical_json(&json!({"b": 1, "a": {"d": 2, "c": 3}})).unwrap();
        let b = canonical_json(&json!({"a": {"c": 3, "d": 2}, "b": 1})).unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with('\n'));
    }

    #[test]
    fn divergence_names_the_first_differing_path() {
        let a = json!({"tick": 3, "herds": [{"x": 1.0}, {"x": 2.0}]});
        let b = json!({"tick": 3, "herds": [{"x": 1.0}, {"x": 2.5}]});
        assert_eq!(first_divergence(&a, &a), None);
        assert_eq!(first_divergence(&a, &b).as_deref(), Some("$.herds[1].x"));

        let longer = json!({"tick": 3, "herds": [{"x": 1.0}, {"x": 2.0}, {"x": 0.0}]});
        assert_eq!(first_divergence(&a, &longer).as_deref(), Some("$.herds[2]"));
        assert_eq!(
            first_divergence(&json!({"a": 1}), &json!({"b": 1})).as_deref(),
            Some("$.a")
        );
    }
}
