// src/model/configuration.rs

//! Structured mojo configuration.
//!
//! Configuration trees are plain TOML tables. Merging follows the
//! dominant/recessive convention: scalar and array values from the dominant
//! side win, nested tables are merged key by key.

use toml::Value;

pub type Configuration = toml::Table;

/// Merge `recessive` underneath `dominant`, returning a new tree.
pub fn merge(dominant: &Configuration, recessive: Option<&Configuration>) -> Configuration {
    let Some(recessive) = recessive else {
        return dominant.clone();
    };

    let mut merged = recessive.clone();
    for (key, value) in dominant {
        let combined = match (value, merged.get(key)) {
            (Value::Table(dom), Some(Value::Table(rec))) => Value::Table(merge(dom, Some(rec))),
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Optional variant of [`merge`]: `None` on both sides stays `None`.
pub fn merge_optional(
    dominant: Option<&Configuration>,
    recessive: Option<&Configuration>,
) -> Option<Configuration> {
    match (dominant, recessive) {
        (Some(dom), rec) => Some(merge(dom, rec)),
        (None, Some(rec)) => Some(rec.clone()),
        (None, None) => None,
    }
}

/// Whether any string in the tree references the session or the reactor
/// project list, which forces reactor-wide concrete state before execution.
pub fn references_session_or_reactor(configuration: &Configuration) -> bool {
    configuration.values().any(value_references_session_or_reactor)
}

fn value_references_session_or_reactor(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains("${session") || s.contains("${reactorProjects}"),
        Value::Array(items) => items.iter().any(value_references_session_or_reactor),
        Value::Table(table) => references_session_or_reactor(table),
        _ => false,
    }
}

/// Flatten a tree into `(KEY_PATH, value)` pairs, nested keys joined by `_`
/// and upper-cased. Arrays are joined with commas.
pub fn flatten(configuration: &Configuration) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(configuration, "", &mut out);
    out
}

fn flatten_into(table: &Configuration, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.to_uppercase()
        } else {
            format!("{prefix}_{}", key.to_uppercase())
        };
        match value {
            Value::Table(nested) => flatten_into(nested, &path, out),
            other => out.push((path, scalar_to_string(other))),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
