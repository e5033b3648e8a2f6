//! Action input: the query string merged with the request body.
//!
//! Repeated keys become arrays. Body values win over query values, and
//! objects present on both sides are merged key by key.

use http::header::{HeaderMap, CONTENT_TYPE};
use outpost_core::{OutpostError, OutpostResult};
use serde_json::{Map, Value};

/// Decodes `a=1&b=2&b=3` into `{"a": "1", "b": ["2", "3"]}`.
///
/// # Errors
///
/// Returns a validation error if the string is not form-encoded.
pub fn parse_urlencoded(raw: &str) -> OutpostResult<Map<String, Value>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| OutpostError::validation(format!("malformed form data: {e}")))?;
    Ok(collect_pairs(pairs))
}

/// Decodes a query string into ordered pairs, keeping repeats.
///
/// Malformed input yields no pairs.
#[must_use]
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}

fn collect_pairs(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match map.get_mut(&key) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    map
}

/// Decodes the body according to its content type.
///
/// JSON bodies must be objects. Form bodies are decoded like query strings.
/// Other content types contribute nothing.
///
/// # Errors
///
/// Returns a validation error for malformed JSON or form data, or a JSON
/// body that is not an object.
pub fn parse_body(headers: &HeaderMap, body: &[u8]) -> OutpostResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .unwrap_or_default();

    if content_type == "application/json" || content_type.ends_with("+json") {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(OutpostError::validation("request body must be a JSON object")),
            Err(e) => Err(OutpostError::validation(format!("malformed JSON body: {e}"))),
        }
    } else if content_type == "application/x-www-form-urlencoded" {
        let raw = std::str::from_utf8(body)
            .map_err(|_| OutpostError::validation("form body is not UTF-8"))?;
        parse_urlencoded(raw)
    } else {
        tracing::debug!(content_type = %content_type, "ignoring request body");
        Ok(Map::new())
    }
}

/// Deep-merges `overlay` into `base`.
pub fn merge(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_repeated_keys_become_arrays() {
        let map = parse_urlencoded("tag=a&tag=b&tag=c&page=2").unwrap();
        assert_eq!(Value::Object(map), json!({ "tag": ["a", "b", "c"], "page": "2" }));
    }

    #[test]
    fn test_query_pairs_keep_order() {
        let pairs = query_pairs(Some("_links=no&access_token=t%20k"));
        assert_eq!(
            pairs,
            vec![
                ("_links".to_string(), "no".to_string()),
                ("access_token".to_string(), "t k".to_string()),
            ]
        );
        assert!(query_pairs(None).is_empty());
    }

    #[test]
    fn test_json_body() {
        let map = parse_body(&headers("application/json; charset=utf-8"), br#"{"a":{"b":1}}"#).unwrap();
        assert_eq!(map["a"], json!({ "b": 1 }));
    }

    #[test]
    fn test_json_body_must_be_object() {
        let err = parse_body(&headers("application/json"), b"[1,2]").unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);

        let err = parse_body(&headers("application/json"), b"{nope").unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_form_body() {
        let map = parse_body(&headers("application/x-www-form-urlencoded"), b"name=bolt&qty=4").unwrap();
        assert_eq!(Value::Object(map), json!({ "name": "bolt", "qty": "4" }));
    }

    #[test]
    fn test_blank_and_unknown_bodies_are_empty() {
        assert!(parse_body(&headers("application/json"), b"  \n").unwrap().is_empty());
        assert!(parse_body(&headers("text/plain"), b"hello").unwrap().is_empty());
        assert!(parse_body(&HeaderMap::new(), b"hello").unwrap().is_empty());
    }

    #[test]
    fn test_body_wins_and_objects_merge() {
        let mut base = parse_urlencoded("name=query&page=1").unwrap();
        base.insert("filter".to_string(), json!({ "color": "red", "size": "s" }));

        let overlay = json!({ "name": "body", "filter": { "size": "xl" } });
        let Value::Object(overlay) = overlay else { unreachable!() };
        merge(&mut base, overlay);

        assert_eq!(
            Value::Object(base),
            json!({ "name": "body", "page": "1", "filter": { "color": "red", "size": "xl" } })
        );
    }
}
