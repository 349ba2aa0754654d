//! Timestamp normalization for weather payloads.
//!
//! Any object found under another object that carries a string `timestamp` is
//! replaced by a copy where `timestamp` holds epoch milliseconds and
//! `LastSeen` keeps the original string. Rewritten nodes are not descended
//! into. The root itself is never rewritten.
//!
//! Arrays are skipped unless [`NormalizeOptions::traverse_arrays`] is set, so
//! records nested in lists keep their string timestamps by default.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

const TIMESTAMP: &str = "timestamp";
const LAST_SEEN: &str = "LastSeen";

/// Traversal options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Also walk array elements.
    pub traverse_arrays: bool,
}

/// Normalize `tree` in place with default options.
pub fn normalize(tree: &mut Value) {
    normalize_with(tree, NormalizeOptions::default());
}

/// Normalize `tree` in place.
///
/// Depth is bounded by the depth of the parsed document (serde_json refuses
/// to parse beyond its recursion limit), so plain recursion is fine here.
pub fn normalize_with(tree: &mut Value, options: NormalizeOptions) {
    match tree {
        Value::Object(map) => walk_object(map, options),
        Value::Array(items) if options.traverse_arrays => walk_array(items, options),
        _ => {}
    }
}

fn walk_object(map: &mut Map<String, Value>, options: NormalizeOptions) {
    for value in map.values_mut() {
        visit(value, options);
    }
}

fn walk_array(items: &mut [Value], options: NormalizeOptions) {
    for item in items {
        visit(item, options);
    }
}

fn visit(value: &mut Value, options: NormalizeOptions) {
    if let Some(original) = string_timestamp(value) {
        let node = std::mem::take(value);
        *value = rewrite(node, original);
        return;
    }

    match value {
        Value::Object(map) => walk_object(map, options),
        Value::Array(items) if options.traverse_arrays => walk_array(items, options),
        _ => {}
    }
}

/// The `timestamp` string of a timestamped record.
fn string_timestamp(value: &Value) -> Option<String> {
    value
        .as_object()?
        .get(TIMESTAMP)?
        .as_str()
        .map(str::to_string)
}

fn rewrite(node: Value, original: String) -> Value {
    match node {
        Value::Object(mut map) => {
            map.insert(TIMESTAMP.to_string(), epoch_millis_value(&original));
            map.insert(LAST_SEEN.to_string(), Value::String(original));
            Value::Object(map)
        }
        other => other,
    }
}

/// Epoch milliseconds as a JSON number, or `null` (JSON's rendering of NaN)
/// when the string is not a recognizable date.
pub fn epoch_millis_value(raw: &str) -> Value {
    parse_epoch_millis(raw).map(Value::from).unwrap_or(Value::Null)
}

/// Parse the date formats the upstream has been seen to emit.
///
/// Offset-less date-times are read as UTC.
pub fn parse_epoch_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rewrites_timestamped_record() {
        let mut tree = json!({"a": {"timestamp": "2024-01-01T00:00:00Z", "weather": "rain"}});
        normalize(&mut tree);

        assert_eq!(tree["a"]["timestamp"], json!(1_704_067_200_000_i64));
        assert_eq!(tree["a"]["LastSeen"], "2024-01-01T00:00:00Z");
        assert_eq!(tree["a"]["weather"], "rain");
    }

    #[test]
    fn test_recurses_into_plain_objects() {
        let mut tree = json!({
            "current": {
                "meta": {"source": "gag", "count": 2},
                "event": {"timestamp": "2024-01-01T00:00:00.500Z", "name": "Thunderstorm"}
            },
            "version": 3
        });
        normalize(&mut tree);

        assert_eq!(
            tree,
            json!({
                "current": {
                    "meta": {"source": "gag", "count": 2},
                    "event": {
                        "timestamp": 1_704_067_200_500_i64,
                        "name": "Thunderstorm",
                        "LastSeen": "2024-01-01T00:00:00.500Z"
                    }
                },
                "version": 3
            })
        );
    }

    #[test]
    fn test_numeric_timestamp_untouched() {
        let mut tree = json!({"a": {"timestamp": 1_704_067_200_000_i64}});
        let before = tree.clone();
        normalize(&mut tree);
        assert_eq!(tree, before);
        assert!(tree["a"].get("LastSeen").is_none());
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut tree = json!({
            "weather": {"timestamp": "2024-05-05T10:00:00+08:00", "active": true},
            "history": {"last": {"timestamp": "garbage"}}
        });
        normalize(&mut tree);
        let once = tree.clone();
        normalize(&mut tree);
        assert_eq!(tree, once);
    }

    #[test]
    fn test_unparseable_timestamp_becomes_null() {
        let mut tree = json!({"a": {"timestamp": "soon"}});
        normalize(&mut tree);
        assert_eq!(tree["a"]["timestamp"], Value::Null);
        assert_eq!(tree["a"]["LastSeen"], "soon");
    }

    #[test]
    fn test_rewritten_node_is_not_descended() {
        let mut tree = json!({"a": {"timestamp": "2024-01-01T00:00:00Z", "inner": {"timestamp": "2024-01-02"}}});
        normalize(&mut tree);
        assert_eq!(tree["a"]["inner"]["timestamp"], "2024-01-02");
    }

    #[test]
    fn test_root_is_not_rewritten() {
        let mut tree = json!({"timestamp": "2024-01-01T00:00:00Z"});
        let before = tree.clone();
        normalize(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_arrays_skipped_by_default() {
        let mut tree = json!({"events": [{"timestamp": "2024-01-01T00:00:00Z"}]});
        let before = tree.clone();
        normalize(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_arrays_traversed_when_enabled() {
        let mut tree = json!({
            "events": [
                {"timestamp": "2024-01-01T00:00:00Z"},
                {"nested": {"timestamp": "2024-01-01T00:00:01Z"}},
                "plain"
            ]
        });
        normalize_with(&mut tree, NormalizeOptions { traverse_arrays: true });

        assert_eq!(tree["events"][0]["timestamp"], json!(1_704_067_200_000_i64));
        assert_eq!(tree["events"][1]["nested"]["timestamp"], json!(1_704_067_201_000_i64));
        assert_eq!(tree["events"][2], "plain");
    }

    #[test]
    fn test_primitive_root() {
        let mut tree = json!("2024-01-01T00:00:00Z");
        normalize(&mut tree);
        assert_eq!(tree, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_keeps_key_order() {
        let mut tree = json!({"a": {"timestamp": "2024-01-01T00:00:00Z", "z": 1}});
        normalize(&mut tree);
        let keys: Vec<&String> = tree["a"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["timestamp", "z", "LastSeen"]);
    }

    #[test]
    fn test_parse_epoch_millis_formats() {
        assert_eq!(parse_epoch_millis("2024-01-01T00:00:00Z"), Some(1_704_067_200_000));
        assert_eq!(parse_epoch_millis("2024-01-01T08:00:00+08:00"), Some(1_704_067_200_000));
        assert_eq!(parse_epoch_millis("Mon, 01 Jan 2024 00:00:00 GMT"), Some(1_704_067_200_000));
        assert_eq!(parse_epoch_millis("2024-01-01 00:00:00"), Some(1_704_067_200_000));
        assert_eq!(parse_epoch_millis("2024-01-01"), Some(1_704_067_200_000));
        assert_eq!(parse_epoch_millis(""), None);
        assert_eq!(parse_epoch_millis("yesterday"), None);
    }
}
