//! The metadata provider.
//!
//! [`Provider`] ties the pieces together: it fetches embed pages, keeps the
//! access token they carry, and consults the playlist API to fill in what
//! the embed pages leave out.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use sunnify::{config::Config, provider::Provider};
//!
//! # async fn run() -> sunnify::Result<()> {
//! let mut provider = Provider::new(Config::default())?;
//! let playlist = provider.playlist_metadata("37i9dQZF1DXcBWIGoYBM5M").await?;
//!
//! let mut tracks = provider.playlist_tracks("37i9dQZF1DXcBWIGoYBM5M").await?;
//! while let Some(track) = tracks.next().await {
//!     println!("{} - {}", track.artists, track.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A provider is not synchronized. Its methods take `&mut self`, and a track
//! stream borrows the provider until it is dropped.

use futures_util::stream::BoxStream;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use serde_json::Value;
use url::Url;

use crate::{
    config::Config,
    entity,
    error::{Error, Result},
    http::Client as HttpClient,
    link::{self, LinkKind},
    playlist::{self, PlaylistInfo},
    protocol::{
        embed,
        spclient::{self, PlaylistContents},
    },
    resolver::Resolver,
    token::CredentialCache,
    track::TrackInfo,
};

pub struct Provider {
    http_client: HttpClient,
    config: Config,
    credentials: CredentialCache,
}

/// What a link resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    Playlist(PlaylistInfo),
    Track(TrackInfo),
}

impl Provider {
    /// Creates a provider with an empty credential cache.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let http_client = HttpClient::new(&config)?;
        let credentials = CredentialCache::new(config.token_margin);

        Ok(Self {
            http_client,
            config,
            credentials,
        })
    }

    /// Playlist metadata, with the complete track count when the playlist
    /// API can be reached.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the embed page cannot be fetched or does not
    /// describe anything. Failures of the playlist API are logged and leave
    /// the embedded count in place.
    pub async fn playlist_metadata(&mut self, playlist_id: &str) -> Result<PlaylistInfo> {
        let document = self.fetch_document("playlist", playlist_id).await?;
        let mut info = PlaylistInfo::from_entity(entity::extract_entity(&document)?);

        match self.playlist_contents(playlist_id).await {
            Ok(Some(contents)) => {
                if let Some(total) = contents.total() {
                    info.track_count = Some(total);
                }
            }
            Ok(None) => debug!("playlist {playlist_id}: no access token for track count"),
            Err(e) => warn!("playlist {playlist_id}: keeping embedded track count ({e})"),
        }

        Ok(info)
    }

    /// Every track of a playlist, in playlist order.
    ///
    /// The embed page is fetched before the stream is returned; everything
    /// after that happens as the stream is polled.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the embed page cannot be fetched or does not
    /// describe anything. Later failures never end the stream with an error.
    pub async fn playlist_tracks(&mut self, playlist_id: &str) -> Result<BoxStream<'_, TrackInfo>> {
        let document = self.fetch_document("playlist", playlist_id).await?;
        let embedded = playlist::embedded_tracks(entity::extract_entity(&document)?);
        debug!("playlist {playlist_id}: {} embedded tracks", embedded.len());

        Ok(Resolver::new(self, playlist_id, embedded).into_stream())
    }

    /// A single track from its own embed page.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the page cannot be fetched or does not describe
    /// anything.
    pub async fn track(&mut self, track_id: &str) -> Result<TrackInfo> {
        let document = self.fetch_document("track", track_id).await?;
        let entity = entity::extract_entity(&document)?;
        Ok(TrackInfo::from_track_entity(entity, track_id))
    }

    /// Whether the playlist exists and is public, as told by the oEmbed
    /// endpoint.
    ///
    /// Any failure counts as `false`.
    pub async fn validate_playlist(&self, playlist_id: &str) -> bool {
        let url = match self.oembed_url(playlist_id) {
            Ok(url) => url,
            Err(e) => {
                debug!("playlist {playlist_id}: {e}");
                return false;
            }
        };

        match self.http_client.probe(url).await {
            Ok(status) => status == StatusCode::OK,
            Err(e) => {
                debug!("playlist {playlist_id}: validation failed ({e})");
                false
            }
        }
    }

    /// An access token that is good for at least the configured margin.
    ///
    /// A cached token is returned as is. Otherwise the playlist's embed page
    /// is fetched to obtain a fresh one.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a refresh was needed and the embed page could
    /// not be fetched. A page without a token yields `Ok(None)`.
    pub async fn valid_token(&mut self, playlist_id: &str) -> Result<Option<String>> {
        if let Some(credential) = self.credentials.valid() {
            return Ok(Some(credential.token.clone()));
        }

        debug!("refreshing access token via playlist {playlist_id}");
        self.credentials.clear();
        self.fetch_document("playlist", playlist_id).await?;

        Ok(self
            .credentials
            .current()
            .map(|credential| credential.token.clone()))
    }

    /// The playlist's complete item list from the playlist API.
    ///
    /// Returns `Ok(None)` when no access token could be obtained.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the API cannot be reached or its response does
    /// not decode.
    pub async fn playlist_contents(&mut self, playlist_id: &str) -> Result<Option<PlaylistContents>> {
        let Some(token) = self.valid_token(playlist_id).await? else {
            return Ok(None);
        };

        let id = checked_id(playlist_id)?;
        let url = Self::join(&self.config.spclient_url, &[spclient::PLAYLIST_PATH, id.as_str()])?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        self.http_client
            .get_json::<PlaylistContents>(url, headers)
            .await
            .map(Some)
    }

    /// Looks up whatever an `open.spotify.com` link points at.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the link is not a playlist or track link, or the
    /// lookup fails.
    pub async fn resolve_link(&mut self, link: &str) -> Result<Resolved> {
        match link::detect(link)? {
            (LinkKind::Playlist, id) => self.playlist_metadata(&id).await.map(Resolved::Playlist),
            (LinkKind::Track, id) => self.track(&id).await.map(Resolved::Track),
        }
    }

    /// Fetches an embed page and returns its JSON document.
    ///
    /// Every fetched document is offered to the credential cache.
    async fn fetch_document(&mut self, kind: &str, id: &str) -> Result<Value> {
        let checked = checked_id(id)?;
        let url = Self::join(&self.config.embed_url, &[kind, checked.as_str()])?;
        let html = self.http_client.get_text(url, HeaderMap::new()).await?;
        let document = embed::document(&html)?;

        if self.credentials.observe(&document) {
            debug!("{kind} {id}: access token refreshed");
        }

        Ok(document)
    }

    fn oembed_url(&self, playlist_id: &str) -> Result<Url> {
        let id = checked_id(playlist_id)?;
        let target = Self::join(&self.config.open_url, &["playlist", id.as_str()])?;
        Url::parse_with_params(self.config.oembed_url.as_str(), &[("url", target.as_str())])
            .map_err(Into::into)
    }

    /// Appends `segments` to `base`, regardless of a trailing slash.
    fn join(base: &Url, segments: &[&str]) -> Result<Url> {
        let url = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            segments.join("/")
        );
        url.parse::<Url>().map_err(Into::into)
    }
}

/// Ids end up in URL paths, so only plain base-62 ids are accepted.
fn checked_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_argument(format!("invalid id: {id:?}")));
    }
    Ok(id.to_owned())
}
