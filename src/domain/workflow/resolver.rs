//! Parameter reference resolution
//!
//! Step parameters may reference earlier outputs with `{{stepId.key}}` (the
//! reserved `trigger` source addresses the trigger seed). Resolution is a
//! literal substitution, evaluated left to right and never re-scanned, so a
//! resolved value cannot expand into further references.
//!
//! The resolver is total: a reference whose source or key is absent from the
//! run data passes through literally, and the driver decides whether an
//! unresolved placeholder is an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::context::ExecutionContext;

/// Reference syntax: `{{source}}` or `{{source.key.nested}}`
static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([a-zA-Z0-9_-]+(?:\.[a-zA-Z0-9_-]+)*)\}\}").unwrap());

/// Resolve every reference in a step's raw parameters against the run data.
///
/// Returns a new map; the original parameters are never mutated, so a workflow
/// document can be reused across runs.
pub fn resolve_parameters(
    parameters: &Map<String, Value>,
    context: &ExecutionContext,
) -> Map<String, Value> {
    parameters
        .iter()
        .map(|(key, value)| (key.clone(), resolve_value(value, context)))
        .collect()
}

/// Resolve references inside a single parameter value, recursing into
/// objects and arrays
pub fn resolve_value(value: &Value, context: &ExecutionContext) -> Value {
    match value {
        Value::String(s) => resolve_string(s, context),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_value(v, context)).collect())
        }
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Resolve references in one string value.
///
/// A string that is exactly one placeholder resolves to the referenced JSON
/// value with its type preserved; placeholders embedded in surrounding text
/// splice in a string rendering.
fn resolve_string(template: &str, context: &ExecutionContext) -> Value {
    // Whole-value reference keeps the referenced type
    if let Some(caps) = REFERENCE_PATTERN.captures(template) {
        let full = caps.get(0).unwrap();

        if full.start() == 0 && full.end() == template.len() {
            let path = caps.get(1).unwrap().as_str();
            return match context.lookup(path) {
                Some(value) => value.clone(),
                None => Value::String(template.to_string()),
            };
        }
    }

    // Otherwise splice each reference in, assembling from the original text
    // so substituted values are never re-scanned
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;

    for caps in REFERENCE_PATTERN.captures_iter(template) {
        let full = caps.get(0).unwrap();
        let path = caps.get(1).unwrap().as_str();

        result.push_str(&template[last_end..full.start()]);

        match context.lookup(path) {
            Some(value) => result.push_str(&value_to_string(value)),
            // Unresolved references pass through literally
            None => result.push_str(full.as_str()),
        }

        last_end = full.end();
    }

    result.push_str(&template[last_end..]);
    Value::String(result)
}

/// Check whether a string contains any reference placeholders
pub fn has_references(template: &str) -> bool {
    REFERENCE_PATTERN.is_match(template)
}

/// String rendering used when a reference is spliced into surrounding text
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),

        // Arrays and objects splice as JSON
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
