//! Navigation of untyped JSON documents.
//!
//! All access into embed documents goes through these functions, so every
//! lookup fails the same way: with `None`, never with a type error. Lists and
//! scalars are opaque to the search; only mappings are descended into.
//!
//! Depth counts nested mapping levels below the starting node, which itself
//! is depth 0.

use serde_json::{Map, Value};

/// Finds the first mapping, in document order, that satisfies `predicate`.
///
/// The search starts at `node` and descends depth first through mapping
/// values, at most `max_depth` levels deep.
pub fn find_map<'a, P>(node: &'a Value, max_depth: usize, predicate: P) -> Option<&'a Map<String, Value>>
where
    P: Fn(&Map<String, Value>) -> bool + Copy,
{
    let map = node.as_object()?;

    if predicate(map) {
        return Some(map);
    }

    if max_depth == 0 {
        return None;
    }

    map.values()
        .find_map(|child| find_map(child, max_depth - 1, predicate))
}

/// Finds the first mapping that directly contains `key`.
///
/// # Examples
///
/// ```rust
/// let doc = json!({"a": {"b": {"trackList": [1]}}});
/// assert!(deep_find(&doc, "trackList", 2).is_some());
/// assert!(deep_find(&doc, "trackList", 1).is_none());
/// ```
#[must_use]
pub fn deep_find<'a>(node: &'a Value, key: &str, max_depth: usize) -> Option<&'a Map<String, Value>> {
    find_map(node, max_depth, |map| map.contains_key(key))
}

/// Walks `path` through nested mappings.
///
/// Returns `None` as soon as a step is not a mapping or lacks the key. An
/// empty path returns `node` itself.
#[must_use]
pub fn resolve_path<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(node, |current, key| current.as_object()?.get(*key))
}

/// Like [`resolve_path`], but only succeeds on a mapping.
#[must_use]
pub fn resolve_map<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Map<String, Value>> {
    resolve_path(node, path)?.as_object()
}

/// Non-empty, trimmed string at `key`.
pub(crate) fn string<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string among `keys`.
pub(crate) fn first_string<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| string(map, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_key_at_top_level() {
        let data = json!({"trackList": [1, 2, 3], "other": "value"});
        let found = deep_find(&data, "trackList", 5).unwrap();
        assert!(std::ptr::eq(found, data.as_object().unwrap()));
    }

    #[test]
    fn finds_key_nested() {
        let data = json!({"a": {"b": {"trackList": [1]}}});
        let found = deep_find(&data, "trackList", 5).unwrap();
        assert_eq!(Value::Object(found.clone()), json!({"trackList": [1]}));
    }

    #[test]
    fn returns_none_when_missing() {
        let data = json!({"a": {"b": {"c": "d"}}});
        assert!(deep_find(&data, "trackList", 5).is_none());
    }

    #[test]
    fn depth_boundary() {
        // The mapping holding the key sits three levels down.
        let data = json!({"a": {"b": {"c": {"trackList": [1]}}}});
        assert!(deep_find(&data, "trackList", 3).is_some());
        assert!(deep_find(&data, "trackList", 2).is_none());
        assert!(deep_find(&data, "trackList", 4).is_some());
    }

    #[test]
    fn depth_zero_only_checks_the_node() {
        let data = json!({"a": {"trackList": []}});
        assert!(deep_find(&data, "trackList", 0).is_none());
        assert!(deep_find(&data, "a", 0).is_some());
    }

    #[test]
    fn non_mappings_yield_nothing() {
        assert!(deep_find(&json!("string"), "key", 5).is_none());
        assert!(deep_find(&json!([]), "key", 5).is_none());
        assert!(deep_find(&json!([{"key": 1}]), "key", 5).is_none());
        assert!(deep_find(&Value::Null, "key", 5).is_none());
    }

    #[test]
    fn first_match_in_document_order() {
        let data = json!({
            "first": {"trackList": [], "name": "one"},
            "second": {"trackList": [], "name": "two"}
        });
        let found = deep_find(&data, "trackList", 3).unwrap();
        assert_eq!(found["name"], "one");
    }

    #[test]
    fn resolves_valid_path() {
        let data = json!({"a": {"b": {"c": "value"}}});
        assert_eq!(resolve_path(&data, &["a", "b", "c"]), Some(&json!("value")));
    }

    #[test]
    fn missing_key_resolves_to_none() {
        let data = json!({"a": {"b": "value"}});
        assert!(resolve_path(&data, &["a", "x"]).is_none());
    }

    #[test]
    fn non_mapping_intermediate_resolves_to_none() {
        let data = json!({"a": "string"});
        assert!(resolve_path(&data, &["a", "b"]).is_none());

        let data = json!({"a": [{"b": 1}]});
        assert!(resolve_path(&data, &["a", "b"]).is_none());
    }

    #[test]
    fn empty_path_returns_node() {
        let data = json!({"a": 1});
        let resolved = resolve_path(&data, &[]).unwrap();
        assert!(std::ptr::eq(resolved, &data));

        let scalar = json!(7);
        assert_eq!(resolve_path(&scalar, &[]), Some(&scalar));
    }

    #[test]
    fn resolve_map_requires_mapping() {
        let data = json!({"a": {"b": 1}});
        assert!(resolve_map(&data, &["a"]).is_some());
        assert!(resolve_map(&data, &["a", "b"]).is_none());
    }

    #[test]
    fn string_helpers_skip_blank_values() {
        let data = json!({"name": "  ", "title": " Title ", "n": 3});
        let map = data.as_object().unwrap();
        assert_eq!(string(map, "name"), None);
        assert_eq!(string(map, "n"), None);
        assert_eq!(first_string(map, &["name", "title"]), Some("Title"));
    }
}
