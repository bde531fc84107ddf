//! Playlist contents as reported by the token-authenticated playlist API.
//!
//! Unlike the embed page, which stops after a fixed number of entries, this
//! API reports the playlist's true length and every item URI, in playlist
//! order.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "length": 150,
//!     "contents": {
//!         "items": [
//!             {"uri": "spotify:track:abc123"},
//!             {"uri": "spotify:episode:def456"}
//!         ]
//!     }
//! }
//! ```
//!
//! `length` has been observed both as a number and as a numeric string.

use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

use crate::track;

/// Path of the playlist resource, relative to the API base.
pub const PLAYLIST_PATH: &str = "playlist/v2/playlist";

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PlaylistContents {
    /// Total number of items in the playlist.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub length: Option<usize>,

    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub contents: Contents,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Contents {
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub uri: String,
}

impl PlaylistContents {
    /// The playlist's item count.
    ///
    /// Prefers the reported `length`; falls back to the number of items
    /// listed when the API left it out.
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        self.length.or_else(|| {
            let listed = self.contents.items.len();
            (listed > 0).then_some(listed)
        })
    }

    /// Track ids in playlist order. Items that are not tracks are skipped.
    pub fn track_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.contents
            .items
            .iter()
            .filter_map(|item| track::id_from_uri(&item.uri))
    }
}
