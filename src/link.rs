//! Parsing of `open.spotify.com` links.
//!
//! Only the id right after the kind segment matters; anything following it,
//! such as a `?si=` share parameter, is ignored.

use std::{fmt, sync::LazyLock};

use regex_lite::Regex;

use crate::error::{Error, Result};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://open\.spotify\.com/(playlist|track)/([a-zA-Z0-9]+)")
        .expect("invalid link pattern")
});

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Playlist,
    Track,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playlist => write!(f, "playlist"),
            Self::Track => write!(f, "track"),
        }
    }
}

/// Determines what a link points at and returns its id.
///
/// # Errors
///
/// Will return `Err` if the link is neither a playlist nor a track link.
pub fn detect(link: &str) -> Result<(LinkKind, String)> {
    let captures = LINK
        .captures(link.trim())
        .ok_or_else(|| Error::invalid_argument("Invalid Spotify URL"))?;

    let kind = match &captures[1] {
        "playlist" => LinkKind::Playlist,
        _ => LinkKind::Track,
    };

    Ok((kind, captures[2].to_owned()))
}

/// The id of a playlist link.
///
/// # Errors
///
/// Will return `Err` if the link is not a playlist link.
pub fn playlist_id(link: &str) -> Result<String> {
    expect_kind(link, LinkKind::Playlist, "Invalid Spotify playlist URL")
}

/// The id of a track link.
///
/// # Errors
///
/// Will return `Err` if the link is not a track link.
pub fn track_id(link: &str) -> Result<String> {
    expect_kind(link, LinkKind::Track, "Invalid Spotify track URL")
}

fn expect_kind(link: &str, expected: LinkKind, message: &'static str) -> Result<String> {
    match detect(link) {
        Ok((kind, id)) if kind == expected => Ok(id),
        _ => Err(Error::invalid_argument(message)),
    }
}
