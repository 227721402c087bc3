//! Parameter sanitization and HTTP-parameter-pollution guard.
//!
//! # Responsibilities
//! - Parse the raw query string into an ordered, duplicate-preserving list
//! - Collapse polluted keys to a single value per the configured policy
//! - HTML-escape string values in route/query parameter maps
//!
//! # Design Decisions
//! - The guard runs before sanitization whenever it is enabled, regardless
//!   of the sanitize flag
//! - Escaping is unconditional per-value, never schema-aware
//! - JSON body and multipart field values are never sanitized here

use serde_json::{Map, Value};

use crate::config::CollapsePolicy;

/// Parse a raw query string into ordered key/value pairs.
///
/// Duplicates are preserved in arrival order so the pollution guard sees
/// the full sequence.
pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}

/// Assemble ordered pairs into a parameter map without pollution
/// protection: a key appearing more than once becomes an array of its
/// values, in arrival order.
pub fn assemble_query(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            None => {
                map.insert(key, Value::String(value));
            }
            Some(Value::Array(values)) => {
                values.push(Value::String(value));
            }
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    map
}

/// Collapse polluted keys to a single value per the configured policy.
pub fn collapse_pollution(
    pairs: Vec<(String, String)>,
    policy: CollapsePolicy,
) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        match policy {
            CollapsePolicy::Last => {
                map.insert(key, Value::String(value));
            }
            CollapsePolicy::First => {
                map.entry(key).or_insert(Value::String(value));
            }
        }
    }
    map
}

/// HTML-escape every string value in the map, in place.
///
/// Array values (unguarded duplicates) have each string element escaped.
pub fn sanitize_values(map: &mut Map<String, Value>) {
    for value in map.values_mut() {
        escape_value(value);
    }
}

fn escape_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            let escaped = html_escape::encode_safe(s.as_str()).into_owned();
            *s = escaped;
        }
        Value::Array(values) => {
            for v in values {
                escape_value(v);
            }
        }
        _ => {}
    }
}
