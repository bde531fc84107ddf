//! The JSON document embedded in an embed page.
//!
//! Embed pages are server-rendered single page applications. Their whole
//! state ships in one script tag:
//!
//! ```html
//! <script id="__NEXT_DATA__" type="application/json">
//! {"props": {"pageProps": {"state": {"data": {"entity": {...}}}}}}
//! </script>
//! ```
//!
//! The tag is found with a fixed pattern on its `id`; no HTML parsing is
//! done.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;

use crate::error::{Error, Result};

/// Element id of the script tag carrying the page state.
pub const SCRIPT_ID: &str = "__NEXT_DATA__";

static NEXT_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*\bid=["']__NEXT_DATA__["'][^>]*>(.*?)</script>"#)
        .expect("invalid __NEXT_DATA__ pattern")
});

/// Extracts and parses the embedded JSON document from `html`.
///
/// # Errors
///
/// Returns an [`Extraction`](crate::error::ErrorKind::Extraction) error if
/// the page has no `__NEXT_DATA__` script or its contents are not JSON.
pub fn document(html: &str) -> Result<Value> {
    let payload = NEXT_DATA
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|payload| payload.as_str().trim())
        .ok_or_else(|| Error::extraction(format!("page carries no {SCRIPT_ID} script")))?;

    serde_json::from_str(payload).map_err(|e| {
        debug!("{SCRIPT_ID} payload: {payload}");
        Error::extraction(format!("{SCRIPT_ID} payload is not valid JSON: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn extracts_multiline_payload() {
        let html = r#"<html><head><title>Embed</title></head><body>
<script src="/app.js"></script>
<script id="__NEXT_DATA__" type="application/json">
{"props": {"pageProps": {"entity": {"name": "Flat"}}}}
</script>
</body></html>"#;

        let doc = document(html).unwrap();
        assert_eq!(doc["props"]["pageProps"]["entity"]["name"], "Flat");
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let html = r#"<script type="application/json" id="__NEXT_DATA__">{"a": 1}</script>"#;
        assert_eq!(document(html).unwrap()["a"], 1);
    }

    #[test]
    fn missing_script_is_extraction_error() {
        let err = document("<html><body>Not found</body></html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
        assert!(err.to_string().contains(SCRIPT_ID));
    }

    #[test]
    fn invalid_json_is_extraction_error() {
        let html = r#"<script id="__NEXT_DATA__">{"props": </script>"#;
        let err = document(html).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Extraction);
    }
}
