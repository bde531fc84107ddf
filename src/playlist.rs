//! Playlist metadata as read from an embed entity.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "type": "playlist",
//!     "name": "Test Playlist",
//!     "subtitle": "Test Owner",
//!     "description": "A test playlist",
//!     "coverArt": {"sources": [
//!         {"url": "https://example.com/small.jpg"},
//!         {"url": "https://example.com/large.jpg"}
//!     ]},
//!     "trackList": [...]
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{entity::TRACK_LIST_KEY, locate, track::TrackInfo};

/// Name used when the entity has none.
const UNKNOWN_NAME: &str = "Unknown Playlist";

/// Owner shown by [`PlaylistInfo::display_name`] when none is known.
const DEFAULT_OWNER: &str = "Spotify";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub name: String,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Embedded entry count, or the complete count once the playlist API
    /// reported one.
    pub track_count: Option<usize>,
}

impl PlaylistInfo {
    #[must_use]
    pub fn from_entity(entity: &Map<String, Value>) -> Self {
        let cover_url = entity
            .get("coverArt")
            .and_then(|cover| cover.get("sources"))
            .and_then(Value::as_array)
            .and_then(|sources| sources.last())
            .and_then(Value::as_object)
            .and_then(|source| locate::string(source, "url"))
            .map(str::to_owned);

        Self {
            name: locate::first_string(entity, &["name", "title"])
                .unwrap_or(UNKNOWN_NAME)
                .to_owned(),
            owner: locate::string(entity, "subtitle").map(str::to_owned),
            description: locate::string(entity, "description").map(str::to_owned),
            cover_url,
            track_count: track_list(entity).map(<[Value]>::len),
        }
    }

    /// Human-readable `"{name} - {owner}"`, as used for folder names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// // "Chill Mix - Spotify" when the owner is unknown
    /// let name = playlist.display_name();
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        let owner = self.owner.as_deref().unwrap_or(DEFAULT_OWNER);
        format!("{} - {owner}", self.name)
            .trim()
            .trim_end_matches(" -")
            .trim_start_matches("- ")
            .trim()
            .to_owned()
    }
}

/// The tracks embedded in a playlist entity, in source order.
///
/// Entries that are not tracks are skipped. A missing or malformed
/// `trackList` yields nothing.
#[must_use]
pub fn embedded_tracks(entity: &Map<String, Value>) -> Vec<TrackInfo> {
    track_list(entity)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
        .filter_map(TrackInfo::from_list_entry)
        .collect()
}

fn track_list(entity: &Map<String, Value>) -> Option<&[Value]> {
    entity
        .get(TRACK_LIST_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}
