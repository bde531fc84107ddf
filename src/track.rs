//! Track records and how they are read from embed data.
//!
//! Tracks come from two places with different shapes:
//!
//! * entries of a playlist entity's `trackList`, which are compact and carry
//!   no album or artwork
//! * the entity of an individual track page, which is richer
//!
//! # Wire Format
//!
//! Playlist list entry:
//! ```json
//! {
//!     "uri": "spotify:track:abc123",
//!     "title": "Song",
//!     "subtitle": "Artist 1, Artist 2",
//!     "duration": 180000,
//!     "audioPreview": {"url": "https://..."}
//! }
//! ```
//!
//! Track page entity:
//! ```json
//! {
//!     "uri": "spotify:track:abc123",
//!     "name": "Song",
//!     "artists": [{"name": "Artist 1"}, {"name": "Artist 2"}],
//!     "duration": 180000,
//!     "visualIdentity": {"image": [{"url": "https://...", "maxWidth": 300}]},
//!     "releaseDate": {"isoString": "2024-01-15T00:00:00Z"},
//!     "audioPreview": {"url": "https://..."}
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::locate;

/// Title used when an entry has none.
const UNKNOWN_TITLE: &str = "Unknown Track";

/// Artist used when an entry has none, and for placeholders.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Smallest cover width that is not a thumbnail.
const MIN_COVER_WIDTH: u64 = 300;

/// Length of the date portion of an ISO 8601 timestamp.
const DATE_LEN: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Opaque identifier, unique within a playlist.
    pub id: String,
    pub title: String,
    /// Display string of comma-joined artist names.
    pub artists: String,
    pub album: Option<String>,
    /// Free-form; usually starts with an ISO 8601 date.
    pub release_date: Option<String>,
    pub cover_url: Option<String>,
    pub duration_ms: Option<u64>,
    pub preview_url: Option<String>,
    /// The record exactly as received.
    pub raw: Map<String, Value>,
}

impl TrackInfo {
    /// Reads a `trackList` entry of a playlist entity.
    ///
    /// Returns `None` for entries whose URI is not a track URI, such as
    /// podcast episodes or local files.
    #[must_use]
    pub fn from_list_entry(entry: &Map<String, Value>) -> Option<Self> {
        let id = locate::string(entry, "uri").and_then(id_from_uri)?;

        let artists = locate::string(entry, "subtitle")
            .map(str::to_owned)
            .or_else(|| artist_names(entry.get("subtitle")))
            .or_else(|| artist_names(entry.get("artists")))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_owned());

        Some(Self {
            id: id.to_owned(),
            title: title(entry),
            artists,
            album: None,
            release_date: None,
            cover_url: None,
            duration_ms: duration(entry),
            preview_url: preview_url(entry),
            raw: entry.clone(),
        })
    }

    /// Reads the entity of an individual track page.
    ///
    /// `requested_id` is used when the entity carries no track URI.
    #[must_use]
    pub fn from_track_entity(entity: &Map<String, Value>, requested_id: &str) -> Self {
        let id = locate::string(entity, "uri")
            .and_then(id_from_uri)
            .unwrap_or(requested_id);

        let artists = artist_names(entity.get("artists"))
            .or_else(|| locate::string(entity, "subtitle").map(str::to_owned))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_owned());

        let album = entity
            .get("album")
            .and_then(Value::as_object)
            .and_then(|album| locate::string(album, "name"))
            .map(str::to_owned);

        Self {
            id: id.to_owned(),
            title: title(entity),
            artists,
            album,
            release_date: release_date(entity),
            cover_url: visual_identity_cover(entity),
            duration_ms: duration(entity),
            preview_url: preview_url(entity),
            raw: entity.clone(),
        }
    }

    /// Minimal record standing in for a track whose page could not be read.
    #[must_use]
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: format!("Track {id}"),
            artists: UNKNOWN_ARTIST.to_owned(),
            album: None,
            release_date: None,
            cover_url: None,
            duration_ms: None,
            preview_url: None,
            raw: Map::new(),
        }
    }

    /// Whether this record is a [`placeholder`](Self::placeholder).
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.raw.is_empty() && self.title == format!("Track {}", self.id)
    }
}

/// Reads the id out of a `<scheme>:track:<id>` URI.
///
/// # Examples
///
/// ```rust
/// assert_eq!(id_from_uri("spotify:track:abc123"), Some("abc123"));
/// assert_eq!(id_from_uri("spotify:episode:abc123"), None);
/// ```
#[must_use]
pub fn id_from_uri(uri: &str) -> Option<&str> {
    let mut parts = uri.split(':');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some("track"), Some(id), None) if !scheme.is_empty() && !id.is_empty() => {
            Some(id)
        }
        _ => None,
    }
}

fn title(map: &Map<String, Value>) -> String {
    locate::first_string(map, &["title", "name"])
        .unwrap_or(UNKNOWN_TITLE)
        .to_owned()
}

fn duration(map: &Map<String, Value>) -> Option<u64> {
    map.get("duration").and_then(Value::as_u64)
}

fn preview_url(map: &Map<String, Value>) -> Option<String> {
    map.get("audioPreview")
        .and_then(Value::as_object)
        .and_then(|preview| locate::string(preview, "url"))
        .map(str::to_owned)
}

/// Comma-joined `name`s of a list of artist objects.
fn artist_names(value: Option<&Value>) -> Option<String> {
    let names: Vec<&str> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|artist| locate::string(artist, "name"))
        .collect();

    (!names.is_empty()).then(|| names.join(", "))
}

/// First cover at least [`MIN_COVER_WIDTH`] wide, else the first cover.
fn visual_identity_cover(entity: &Map<String, Value>) -> Option<String> {
    let images: Vec<&Map<String, Value>> = entity
        .get("visualIdentity")
        .and_then(|identity| identity.get("image"))
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_object)
        .filter(|image| locate::string(image, "url").is_some())
        .collect();

    let declared_width = |image: &Map<String, Value>| {
        ["maxWidth", "width"]
            .iter()
            .find_map(|key| image.get(*key).and_then(Value::as_u64))
    };

    images
        .iter()
        .find(|image| declared_width(image).is_some_and(|width| width >= MIN_COVER_WIDTH))
        .or_else(|| images.first())
        .and_then(|image| locate::string(image, "url"))
        .map(str::to_owned)
}

fn release_date(entity: &Map<String, Value>) -> Option<String> {
    match entity.get("releaseDate")? {
        Value::String(date) => Some(date.trim().to_owned()).filter(|date| !date.is_empty()),
        Value::Object(date) => locate::string(date, "isoString")
            .map(|iso| iso.chars().take(DATE_LEN).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn uri_parsing() {
        assert_eq!(id_from_uri("spotify:track:abc123"), Some("abc123"));
        assert_eq!(id_from_uri("spotify:episode:abc123"), None);
        assert_eq!(id_from_uri("spotify:track:"), None);
        assert_eq!(id_from_uri("track:abc"), None);
        assert_eq!(id_from_uri("spotify:track:abc:extra"), None);
        assert_eq!(id_from_uri(""), None);
    }

    #[test]
    fn list_entry() {
        let entry = map(json!({
            "uri": "spotify:track:abc123",
            "title": "Test Song 1",
            "subtitle": "Artist 1",
            "duration": 180_000,
            "audioPreview": {"url": "https://preview.example.com/1.mp3"},
            "album": {"name": "Ignored"}
        }));

        let track = TrackInfo::from_list_entry(&entry).unwrap();
        assert_eq!(track.id, "abc123");
        assert_eq!(track.title, "Test Song 1");
        assert_eq!(track.artists, "Artist 1");
        assert_eq!(track.album, None);
        assert_eq!(track.duration_ms, Some(180_000));
        assert_eq!(
            track.preview_url.as_deref(),
            Some("https://preview.example.com/1.mp3")
        );
        assert_eq!(track.raw, entry);
    }

    #[test]
    fn list_entry_with_artist_objects() {
        let entry = map(json!({
            "uri": "spotify:track:x",
            "name": "By Name",
            "subtitle": [{"name": "A"}, {"name": "B"}, {"id": "no-name"}]
        }));

        let track = TrackInfo::from_list_entry(&entry).unwrap();
        assert_eq!(track.title, "By Name");
        assert_eq!(track.artists, "A, B");
        assert_eq!(track.duration_ms, None);
        assert_eq!(track.preview_url, None);
    }

    #[test]
    fn list_entry_without_track_uri_is_skipped() {
        assert!(TrackInfo::from_list_entry(&map(json!({"uri": "spotify:episode:e"}))).is_none());
        assert!(TrackInfo::from_list_entry(&map(json!({"title": "No uri"}))).is_none());
    }

    #[test]
    fn list_entry_defaults() {
        let track = TrackInfo::from_list_entry(&map(json!({"uri": "spotify:track:x"}))).unwrap();
        assert_eq!(track.title, "Unknown Track");
        assert_eq!(track.artists, UNKNOWN_ARTIST);
    }

    #[test]
    fn track_entity() {
        let entity = map(json!({
            "uri": "spotify:track:solo1",
            "name": "Individual Track",
            "title": "Individual Track",
            "subtitle": "Subtitle Artist",
            "duration": 210_000,
            "artists": [{"name": "Solo Artist"}, {"name": "Feature"}],
            "album": {"name": "Solo Album"},
            "visualIdentity": {"image": [
                {"url": "https://example.com/small.jpg", "maxWidth": 64},
                {"url": "https://example.com/large.jpg", "maxWidth": 300},
                {"url": "https://example.com/huge.jpg", "maxWidth": 640}
            ]},
            "releaseDate": {"isoString": "2024-01-15T00:00:00Z"},
            "audioPreview": {"url": "https://preview.example.com/track.mp3"}
        }));

        let track = TrackInfo::from_track_entity(&entity, "requested");
        assert_eq!(track.id, "solo1");
        assert_eq!(track.title, "Individual Track");
        assert_eq!(track.artists, "Solo Artist, Feature");
        assert_eq!(track.album.as_deref(), Some("Solo Album"));
        assert_eq!(track.cover_url.as_deref(), Some("https://example.com/large.jpg"));
        assert_eq!(track.release_date.as_deref(), Some("2024-01-15"));
        assert_eq!(track.duration_ms, Some(210_000));
        assert_eq!(
            track.preview_url.as_deref(),
            Some("https://preview.example.com/track.mp3")
        );
    }

    #[test]
    fn track_entity_fallbacks() {
        let entity = map(json!({
            "title": "Fallbacks",
            "subtitle": "Only Subtitle",
            "visualIdentity": {"image": [
                {"url": "https://example.com/a.jpg", "maxWidth": 64},
                {"url": "https://example.com/b.jpg", "maxWidth": 128}
            ]},
            "releaseDate": "2019-05-01"
        }));

        let track = TrackInfo::from_track_entity(&entity, "requested");
        assert_eq!(track.id, "requested");
        assert_eq!(track.artists, "Only Subtitle");
        assert_eq!(track.cover_url.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(track.release_date.as_deref(), Some("2019-05-01"));
        assert_eq!(track.album, None);
    }

    #[test]
    fn cover_width_may_be_declared_as_width() {
        let entity = map(json!({
            "visualIdentity": {"image": [
                {"url": "https://example.com/a.jpg", "width": 64},
                {"url": "https://example.com/b.jpg", "width": 300}
            ]}
        }));
        let track = TrackInfo::from_track_entity(&entity, "x");
        assert_eq!(track.cover_url.as_deref(), Some("https://example.com/b.jpg"));
    }

    #[test]
    fn placeholder() {
        let track = TrackInfo::placeholder("abc");
        assert_eq!(track.title, "Track abc");
        assert_eq!(track.artists, "Unknown Artist");
        assert!(track.is_placeholder());

        let real = TrackInfo::from_list_entry(&map(json!({"uri": "spotify:track:abc"}))).unwrap();
        assert!(!real.is_placeholder());
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(TrackInfo::placeholder("abc")).unwrap();
        assert_eq!(value["id"], "abc");
        assert!(value.get("durationMs").is_some());
        assert!(value.get("coverUrl").is_some());
        assert!(value.get("releaseDate").is_some());
    }
}
