//! Envelope unwrapping and depth-first field location over raw JSON payloads.
//!
//! Management APIs return the same logical fields under different shapes.
//! The helpers here are the shared vocabulary the extractors build on:
//!
//! - [`unwrap_payload`] strips `{"value": ...}` response envelopes.
//! - [`find_all`] walks a payload depth-first and records the first
//!   non-empty value seen for each requested alias.
//! - [`is_truthy`], [`first_truthy`] and [`value_text`] give loosely-typed
//!   values a predictable reading.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Maximum number of keys an object may carry and still be treated as an
/// envelope around its `"value"` entry.
pub const ENVELOPE_MAX_KEYS: usize = 3;

/// Returns the payload wrapped in a `{"value": ...}` envelope.
///
/// An envelope is an object that contains a `"value"` key and has at most
/// [`ENVELOPE_MAX_KEYS`] keys in total. Stacked envelopes are peeled until
/// the payload is no longer an envelope, so the function is idempotent.
///
/// # Examples
///
/// ```
/// use backup_report_core::unwrap_payload;
/// use serde_json::json;
///
/// let wrapped = json!({"value": [1, 2], "count": 2});
/// assert_eq!(unwrap_payload(&wrapped), &json!([1, 2]));
///
/// let plain = json!({"value": 1, "a": 2, "b": 3, "c": 4});
/// assert_eq!(unwrap_payload(&plain), &plain);
/// ```
pub fn unwrap_payload(value: &Value) -> &Value {
    let mut current = value;
    while let Value::Object(map) = current {
        match map.get("value") {
            Some(inner) if map.len() <= ENVELOPE_MAX_KEYS => current = inner,
            _ => break,
        }
    }
    current
}

/// Returns `true` for values the locator treats as absent: `null`, the
/// empty string and the empty array.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Truthiness used by every "first non-empty of" alias chain.
///
/// `null`, `false`, zero, the empty string and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Returns the first truthy value stored under one of `keys`, in key order.
pub fn first_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

/// Renders a loosely-typed value as report text.
///
/// Strings are returned verbatim, arrays as `[a, b]` with each element
/// rendered the same way, and everything else through its JSON form.
///
/// # Examples
///
/// ```
/// use backup_report_core::value_text;
/// use serde_json::json;
///
/// assert_eq!(value_text(&json!("nfs://host")), "nfs://host");
/// assert_eq!(value_text(&json!(7)), "7");
/// assert_eq!(value_text(&json!([1, "two"])), "[1, two]");
/// ```
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(value_text).collect();
            format!("[{}]", parts.join(", "))
        }
        other => other.to_string(),
    }
}

/// First non-empty values found for a set of aliases.
///
/// Produced by [`find_all`]. Lookups by alias return the value that was
/// encountered first during the depth-first walk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FoundFields<'a> {
    hits: HashMap<&'a str, &'a Value>,
}

impl<'a> FoundFields<'a> {
    /// Returns the value found for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.hits.get(key).copied()
    }

    /// Returns `true` when a value was found for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.hits.contains_key(key)
    }

    /// Returns the first truthy value among `keys`, in key order.
    pub fn first_truthy(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| is_truthy(value))
    }

    /// Number of aliases that were found.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Returns `true` when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Walks `root` depth-first and records the first non-empty value for each
/// key in `keys`.
///
/// An object's own entries are inspected before any of its nested objects
/// or arrays are entered, and children are visited in document order. The
/// walk uses an explicit stack, so nesting depth is bounded only by memory.
///
/// # Examples
///
/// ```
/// use backup_report_core::find_all;
/// use serde_json::json;
///
/// let schedule = json!({
///     "recurrence": {"hour": 2, "minute": ""},
///     "hour": 5,
///     "nested": {"minute": 30}
/// });
/// let found = find_all(&schedule, &["hour", "minute"]);
/// assert_eq!(found.get("hour"), Some(&json!(5)));
/// assert_eq!(found.get("minute"), Some(&json!(30)));
/// ```
pub fn find_all<'a>(root: &'a Value, keys: &[&'a str]) -> FoundFields<'a> {
    match Node::from_value(root) {
        Some(node) => walk(node, keys),
        None => FoundFields::default(),
    }
}

/// Same as [`find_all`], rooted at an object the caller already holds as a
/// map.
pub fn find_all_in<'a>(root: &'a Map<String, Value>, keys: &[&'a str]) -> FoundFields<'a> {
    walk(Node::Object(root), keys)
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
}

impl<'a> Node<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::Object(map)),
            Value::Array(items) => Some(Self::Array(items)),
            _ => None,
        }
    }
}

fn walk<'a>(root: Node<'a>, keys: &[&'a str]) -> FoundFields<'a> {
    let mut found = FoundFields::default();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if found.len() == keys.len() {
            break;
        }
        match node {
            Node::Object(map) => {
                for (key, value) in map {
                    if is_empty_value(value) {
                        continue;
                    }
                    if let Some(alias) = keys.iter().find(|alias| **alias == key.as_str()) {
                        found.hits.entry(*alias).or_insert(value);
                    }
                }
                stack.extend(map.values().rev().filter_map(Node::from_value));
            }
            Node::Array(items) => {
                stack.extend(items.iter().rev().filter_map(Node::from_value));
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_strips_small_envelope() {
        let wrapped = json!({"value": {"hostname": "vc01"}, "type": "x", "ok": true});
        assert_eq!(unwrap_payload(&wrapped), &json!({"hostname": "vc01"}));
    }

    #[test]
    fn test_unwrap_leaves_large_object_alone() {
        let obj = json!({"value": 1, "a": 1, "b": 2, "c": 3});
        assert_eq!(unwrap_payload(&obj), &obj);
    }

    #[test]
    fn test_unwrap_is_idempotent() {
        let inputs = [
            json!({"value": {"value": [1]}}),
            json!({"value": null}),
            json!([{"value": 1}]),
            json!("value"),
            json!({"hostname": "a"}),
        ];
        for input in &inputs {
            let once = unwrap_payload(input);
            assert_eq!(unwrap_payload(once), once);
        }
    }

    #[test]
    fn test_empty_value_vocabulary() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
    }

    #[test]
    fn test_find_all_first_occurrence_wins() {
        let node = json!({
            "a": {"status": "inner"},
            "status": "outer",
            "b": [{"status": "deep"}, {"location": "nfs://x"}]
        });
        let found = find_all(&node, &["status", "location"]);
        assert_eq!(found.get("status"), Some(&json!("outer")));
        assert_eq!(found.get("location"), Some(&json!("nfs://x")));
    }

    #[test]
    fn test_find_all_visits_children_in_document_order() {
        let node = json!({
            "first": {"deeper": {"type": "one"}},
            "second": {"type": "two"}
        });
        let found = find_all(&node, &["type"]);
        assert_eq!(found.get("type"), Some(&json!("one")));
    }

    #[test]
    fn test_find_all_skips_empty_values() {
        let node = json!({"url": "", "x": {"url": null}, "y": [{"url": "smb://share"}]});
        let found = find_all(&node, &["url"]);
        assert_eq!(found.get("url"), Some(&json!("smb://share")));
    }

    #[test]
    fn test_find_all_keeps_empty_object_values() {
        let node = json!({"retention": {}});
        let found = find_all(&node, &["retention"]);
        assert!(found.contains("retention"));
    }

    #[test]
    fn test_find_all_in_map_root() {
        let node = json!({"enable": false, "inner": {"enable": true}});
        let found = find_all_in(node.as_object().unwrap(), &["enable"]);
        assert_eq!(found.get("enable"), Some(&json!(false)));
    }

    #[test]
    fn test_find_all_handles_deep_nesting() {
        let mut node = json!({"target": "sftp://deep"});
        for _ in 0..50_000 {
            let mut wrapper = Map::new();
            wrapper.insert("wrap".to_string(), Value::Array(vec![node]));
            node = Value::Object(wrapper);
        }
        let found = find_all(&node, &["target"]);
        assert_eq!(found.get("target"), Some(&json!("sftp://deep")));
        // serde_json drops recursively; leak to avoid overflowing on drop.
        std::mem::forget(node);
    }

    #[test]
    fn test_value_text_forms() {
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(null)), "null");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!(["mon", 2])), "[mon, 2]");
    }
}
