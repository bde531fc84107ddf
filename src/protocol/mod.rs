//! Wire formats of the two data sources.
//!
//! # Submodules
//!
//! * [`embed`] - locating the `__NEXT_DATA__` JSON document inside an embed
//!   page's HTML
//! * [`spclient`] - the token-authenticated playlist API that reports
//!   complete track counts and URI lists
//!
//! Embed documents stay untyped ([`serde_json::Value`]) because their shape
//! drifts between deployments; see [`crate::entity`] for how they are
//! navigated. The playlist API is stable enough to deserialize into types.

pub mod embed;
pub mod spclient;

use crate::error::Result;
use serde::Deserialize;
use std::fmt::Debug;

/// Parses and logs JSON responses.
///
/// # Arguments
///
/// * `body` - Response body text to parse
/// * `origin` - Description of the endpoint for logging
///
/// # Errors
///
/// Returns an [`Extraction`](crate::error::ErrorKind::Extraction) error if:
/// * Response body is not valid JSON
/// * JSON structure doesn't match type `T`
///
/// # Logging
///
/// * Success: Logs parsed structure at TRACE level
/// * Parse Error: Logs raw JSON at TRACE level if valid JSON
/// * Invalid JSON: Logs error and raw text at ERROR level
pub fn json<T>(body: &str, origin: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Debug,
{
    match serde_json::from_str(body) {
        Ok(result) => {
            trace!("{}: {result:#?}", origin);
            Ok(result)
        }
        Err(e) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
                trace!("{}: {json:#?}", origin);
            } else {
                error!("{}: failed parsing response ({e:?})", origin);
                trace!("{body}");
            }
            Err(e.into())
        }
    }
}
