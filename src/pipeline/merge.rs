//! Body merging: one candidate object out of all input sources.
//!
//! # Responsibilities
//! - Deep-merge object sources, later sources winning on key collision
//! - Merge order: multipart fields → route params → query params → JSON body
//! - Lenient JSON body parsing (any top-level value)
//!
//! # Design Decisions
//! - Non-object top-level bodies parse fine but contribute nothing to the
//!   candidate; only objects carry mergeable keys
//! - An unparseable JSON body is treated as absent, not as a request error

use serde_json::{Map, Value};

/// Recursively merge `src` into `dest`. Object values merge key-by-key;
/// anything else in `src` replaces the destination value outright.
pub fn deep_merge(dest: &mut Value, src: Value) {
    match (dest, src) {
        (Value::Object(dest_map), Value::Object(src_map)) => {
            for (key, src_value) in src_map {
                match dest_map.get_mut(&key) {
                    Some(dest_value) => deep_merge(dest_value, src_value),
                    None => {
                        dest_map.insert(key, src_value);
                    }
                }
            }
        }
        (dest, src) => *dest = src,
    }
}

/// Build the validation candidate from all sources.
///
/// Later sources override earlier ones on key collision, so the JSON body
/// wins over query, query over route params, and route params over
/// multipart fields.
pub fn build_candidate(
    multipart_fields: Map<String, Value>,
    params: Map<String, Value>,
    query: Map<String, Value>,
    body: Option<Value>,
) -> Value {
    let mut candidate = Value::Object(multipart_fields);
    deep_merge(&mut candidate, Value::Object(params));
    deep_merge(&mut candidate, Value::Object(query));
    if let Some(body @ Value::Object(_)) = body {
        deep_merge(&mut candidate, body);
    }
    candidate
}

/// Parse a JSON body leniently: empty bodies and unparseable payloads are
/// `None`, any valid top-level JSON value is `Some`.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "JSON body did not parse, treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn body_wins_over_every_other_source() {
        let candidate = build_candidate(
            obj(json!({"a": "mp", "only_mp": 1})),
            obj(json!({"a": "param", "only_param": 2})),
            obj(json!({"a": "query", "only_query": 3})),
            Some(json!({"a": "body"})),
        );
        assert_eq!(
            candidate,
            json!({"a": "body", "only_mp": 1, "only_param": 2, "only_query": 3})
        );
    }

    #[test]
    fn query_wins_over_params_and_multipart() {
        let candidate = build_candidate(
            obj(json!({"a": "mp"})),
            obj(json!({"a": "param"})),
            obj(json!({"a": "query"})),
            None,
        );
        assert_eq!(candidate, json!({"a": "query"}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let candidate = build_candidate(
            obj(json!({"user": {"name": "mp", "age": 30}})),
            obj(json!({})),
            obj(json!({})),
            Some(json!({"user": {"name": "body"}})),
        );
        assert_eq!(candidate, json!({"user": {"name": "body", "age": 30}}));
    }

    #[test]
    fn scalar_body_contributes_nothing() {
        let candidate = build_candidate(
            obj(json!({"a": 1})),
            obj(json!({})),
            obj(json!({})),
            Some(json!(42)),
        );
        assert_eq!(candidate, json!({"a": 1}));
    }

    #[test]
    fn lenient_parse_accepts_scalars() {
        assert_eq!(parse_body(b"42"), Some(json!(42)));
        assert_eq!(parse_body(b"\"x\""), Some(json!("x")));
        assert_eq!(parse_body(b""), None);
        assert_eq!(parse_body(b"{not json"), None);
    }
}
