//! Locating the entity inside an embed document.
//!
//! The embed site has moved its entity around between deployments. Known
//! placements are listed in [`ENTITY_PATHS`], newest first; supporting a new
//! variant means adding one line there. When none of them match, a bounded
//! search looks for anything that resembles an entity.

use serde_json::{Map, Value};

use crate::{
    error::{Error, Result},
    locate,
};

/// Known placements of the entity, tried in order.
pub const ENTITY_PATHS: &[&[&str]] = &[
    &["props", "pageProps", "state", "data", "entity"],
    &["props", "pageProps", "data", "entity"],
    &["props", "pageProps", "entity"],
];

/// Known placements of the session object holding the access token.
pub const SESSION_PATHS: &[&[&str]] = &[
    &["props", "pageProps", "state", "settings", "session"],
    &["props", "pageProps", "settings", "session"],
    &["props", "pageProps", "session"],
];

/// The container the entity paths start from; its keys are reported when
/// nothing is found.
const CONTAINER_PATH: &[&str] = &["props", "pageProps"];

/// Key that marks a track collection.
pub const TRACK_LIST_KEY: &str = "trackList";

/// Values of `type` that identify an entity.
const ENTITY_TYPES: &[&str] = &["playlist", "track"];

/// How deep the fallback searches descend from the document root.
pub const SEARCH_DEPTH: usize = 6;

/// Number of container keys listed in the error message.
const REPORTED_KEYS: usize = 10;

/// Locates the entity describing a playlist or track.
///
/// Tries [`ENTITY_PATHS`] first, then the first mapping holding a
/// [`TRACK_LIST_KEY`], then the first mapping whose `type` is `playlist` or
/// `track`.
///
/// # Errors
///
/// Returns an [`Extraction`](crate::error::ErrorKind::Extraction) error when
/// every strategy fails. The message lists up to ten keys found at
/// `props.pageProps` (or at the root when that is missing) to help
/// recognize a new schema variant.
pub fn extract_entity(document: &Value) -> Result<&Map<String, Value>> {
    if let Some(entity) = ENTITY_PATHS
        .iter()
        .find_map(|path| locate::resolve_map(document, path))
    {
        return Ok(entity);
    }

    if let Some(entity) = locate::deep_find(document, TRACK_LIST_KEY, SEARCH_DEPTH) {
        debug!("entity found by searching for {TRACK_LIST_KEY}");
        return Ok(entity);
    }

    if let Some(entity) = locate::find_map(document, SEARCH_DEPTH, |map| {
        map.get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| ENTITY_TYPES.contains(&kind))
    }) {
        debug!("entity found by its type discriminator");
        return Ok(entity);
    }

    let (level, keys) = match locate::resolve_map(document, CONTAINER_PATH) {
        Some(container) => ("pageProps", available_keys(container)),
        None => ("top-level", document.as_object().map(available_keys).unwrap_or_default()),
    };

    Err(Error::extraction(format!(
        "could not locate entity in embed data; {level} keys: {keys}"
    )))
}

/// Locates the session object carrying the access token, if any.
#[must_use]
pub fn extract_session(document: &Value) -> Option<&Map<String, Value>> {
    SESSION_PATHS
        .iter()
        .filter_map(|path| locate::resolve_map(document, path))
        .find(|session| session.contains_key("accessToken"))
}

fn available_keys(map: &Map<String, Value>) -> String {
    if map.is_empty() {
        return "<none>".to_owned();
    }

    map.keys()
        .take(REPORTED_KEYS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn entity_value(document: &Value) -> Value {
        Value::Object(extract_entity(document).unwrap().clone())
    }

    #[test]
    fn standard_path() {
        let doc = json!({"props": {"pageProps": {"state": {"data": {"entity": {"name": "Test"}}}}}});
        assert_eq!(entity_value(&doc), json!({"name": "Test"}));
    }

    #[test]
    fn path_without_state_wrapper() {
        let doc = json!({"props": {"pageProps": {"data": {"entity": {"name": "X"}}}}});
        assert_eq!(entity_value(&doc), json!({"name": "X"}));
    }

    #[test]
    fn flat_path() {
        let doc = json!({"props": {"pageProps": {"entity": {"name": "Flat"}}}});
        assert_eq!(entity_value(&doc), json!({"name": "Flat"}));
    }

    #[test]
    fn earlier_paths_win() {
        let doc = json!({"props": {"pageProps": {
            "entity": {"name": "Flat"},
            "state": {"data": {"entity": {"name": "Nested"}}}
        }}});
        assert_eq!(entity_value(&doc)["name"], "Nested");
    }

    #[test]
    fn non_mapping_at_known_path_falls_through() {
        let doc = json!({"props": {"pageProps": {
            "state": {"data": {"entity": "gone"}},
            "entity": {"name": "Flat"}
        }}});
        assert_eq!(entity_value(&doc)["name"], "Flat");
    }

    #[test]
    fn track_list_search_fallback() {
        let doc = json!({"props": {"pageProps": {"weirdKey": {
            "nested": {"trackList": [{"uri": "spotify:track:x"}], "name": "Deep"}
        }}}});
        let entity = entity_value(&doc);
        assert_eq!(entity["name"], "Deep");
        assert!(entity.get("trackList").is_some());
    }

    #[test]
    fn discriminator_fallback() {
        let doc = json!({"props": {"pageProps": {"payload": {
            "meta": {"kind": "page"},
            "item": {"type": "track", "name": "Typed"}
        }}}});
        assert_eq!(entity_value(&doc)["name"], "Typed");
    }

    #[test]
    fn unrelated_type_is_not_an_entity() {
        let doc = json!({"props": {"pageProps": {"item": {"type": "album"}}}});
        assert!(extract_entity(&doc).is_err());
    }

    #[test]
    fn malformed_document_reports_container_keys() {
        let doc = json!({"props": {"pageProps": {"unrelated": 1}}});
        let err = extract_entity(&doc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
        assert!(err.to_string().contains("pageProps keys: unrelated"));
    }

    #[test]
    fn reports_at_most_ten_keys() {
        let keys: Map<String, Value> = (0..15).map(|i| (format!("k{i}"), json!(i))).collect();
        let doc = json!({"props": {"pageProps": keys}});
        let message = extract_entity(&doc).unwrap_err().to_string();
        assert!(message.contains("k9"));
        assert!(!message.contains("k10"));
    }

    #[test]
    fn missing_container_reports_top_level_keys() {
        let doc = json!({"buildId": "abc", "page": "/embed"});
        let message = extract_entity(&doc).unwrap_err().to_string();
        assert!(message.contains("top-level keys: buildId, page"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let doc = json!({"props": {"pageProps": {"state": {"data": {"entity": {
            "name": "Test", "trackList": [{"uri": "spotify:track:a"}]
        }}}}}});
        let first = entity_value(&doc);
        let second = entity_value(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn session_paths() {
        for doc in [
            json!({"props": {"pageProps": {"state": {"settings": {"session": {"accessToken": "tok"}}}}}}),
            json!({"props": {"pageProps": {"settings": {"session": {"accessToken": "tok"}}}}}),
            json!({"props": {"pageProps": {"session": {"accessToken": "tok"}}}}),
        ] {
            let session = extract_session(&doc).unwrap();
            assert_eq!(session["accessToken"], "tok");
        }
    }

    #[test]
    fn session_without_token_is_skipped() {
        let doc = json!({"props": {"pageProps": {
            "state": {"settings": {"session": {"isAnonymous": true}}},
            "session": {"accessToken": "flat"}
        }}});
        assert_eq!(extract_session(&doc).unwrap()["accessToken"], "flat");
    }
}
