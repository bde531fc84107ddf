//! Provider configuration.
//!
//! Defaults target the live service. Every endpoint is a base URL so a
//! provider can just as well be pointed at a mirror or a local mock server.
//!
//! # File Format
//!
//! ```toml
//! embed_url = "https://open.spotify.com/embed"
//! timeout = 30
//! max_attempts = 5
//! backoff_factor = 0.5
//! ```
//!
//! Keys that are left out keep their default.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use url::Url;

use crate::error::{Error, Result};

#[serde_as]
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `User-Agent` sent with every request.
    ///
    /// The embed pages are served to browsers, so this mimics one.
    pub user_agent: String,

    /// Two-letter language code for `Accept-Language`.
    pub app_lang: String,

    /// Base of the embed pages, suffixed with `/playlist/{id}` or `/track/{id}`.
    pub embed_url: Url,

    /// Base of the public web player, used to build links for validation.
    pub open_url: Url,

    /// Base of the token-authenticated playlist API.
    pub spclient_url: Url,

    /// oEmbed endpoint used by playlist validation.
    pub oembed_url: Url,

    /// Per-request timeout.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,

    /// Number of calls the transport makes before giving up.
    ///
    /// Sleeps between calls double each time but are capped at 60s, so a
    /// large budget ends in a series of one-minute sleeps.
    pub max_attempts: u32,

    /// Seconds to sleep before the first retry; doubles on every retry.
    ///
    /// A single sleep never exceeds 60s, whatever the factor.
    pub backoff_factor: f64,

    /// Credentials this close to expiry are refreshed before use.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub token_margin: Duration,
}

impl Config {
    /// Largest configuration file that will be read.
    const MAX_FILE_SIZE: u64 = 64 * 1024;

    const DEFAULT_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the file cannot be read or is unreasonably large
    /// - the contents are not valid TOML or contain invalid values
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: configuration should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::invalid_argument(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        contents.parse()
    }

    /// Checks values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - `max_attempts` is zero
    /// - `backoff_factor` is negative or not finite
    /// - `user_agent` is empty or `app_lang` is not a two-letter code
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_argument(
                "max_attempts must allow at least one call",
            ));
        }

        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(Error::invalid_argument(format!(
                "backoff_factor must be a non-negative number of seconds, not {}",
                self.backoff_factor
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::invalid_argument("user agent is empty"));
        }

        if self.app_lang.chars().count() != 2 || !self.app_lang.is_ascii() {
            return Err(Error::invalid_argument(format!(
                "language should be a two-letter code but is \"{}\"",
                self.app_lang
            )));
        }

        Ok(())
    }

    /// Delay before the first retry.
    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        Duration::try_from_secs_f64(self.backoff_factor).unwrap_or(Duration::ZERO)
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let parse = |url: &str| Url::parse(url).expect("invalid default url");

        Self {
            user_agent: Self::DEFAULT_USER_AGENT.to_owned(),
            app_lang: "en".to_owned(),

            embed_url: parse("https://open.spotify.com/embed"),
            open_url: parse("https://open.spotify.com"),
            spclient_url: parse("https://spclient.wg.spotify.com"),
            oembed_url: parse("https://open.spotify.com/oembed"),

            timeout: Duration::from_secs(20),
            max_attempts: 3,
            backoff_factor: 1.0,
            token_margin: Duration::from_secs(60),
        }
    }
}
