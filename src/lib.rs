//! Playlist and track metadata from Spotify embed pages.
//!
//! Embed pages are public and carry their data as a JSON document, but only
//! the first entries of a large playlist. A [`Provider`] reads those pages,
//! keeps the short-lived access token they carry, and uses it to complete
//! playlists from the token-authenticated playlist API.
//!
//! The layout of the embed documents drifts between deployments, so every
//! lookup tolerates several known layouts and falls back to a bounded search
//! (see [`entity`] and [`locate`]).
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod link;
pub mod locate;
pub mod playlist;
pub mod protocol;
pub mod provider;
pub mod resolver;
pub mod token;
pub mod track;
pub mod util;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use playlist::PlaylistInfo;
pub use provider::{Provider, Resolved};
pub use track::TrackInfo;
