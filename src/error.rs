//! Error handling for sunnify.
//!
//! Every failure in the crate is an [`struct@Error`]: a category
//! ([`ErrorKind`]) plus the underlying error. The category decides whether
//! the transport retries:
//!
//! * [`ErrorKind::Network`] - connection or timeout failures and unexpected
//!   HTTP statuses; retried
//! * [`ErrorKind::RateLimited`] - HTTP 429; retried after back-off
//! * [`ErrorKind::Extraction`] - the page was fetched but is not accessible
//!   (HTTP 401/403) or does not carry the expected structure; never retried
//! * [`ErrorKind::InvalidArgument`] and [`ErrorKind::Internal`] - caller and
//!   setup mistakes
//!
//! # Example
//!
//! ```rust
//! use sunnify::error::{Error, ErrorKind, Result};
//!
//! fn locate() -> Result<()> {
//!     Err(Error::extraction("no entity found; pageProps keys: unrelated"))
//! }
//!
//! match locate() {
//!     Err(e) if e.kind == ErrorKind::Extraction => eprintln!("schema changed? {e}"),
//!     _ => {}
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Main error type combining error kind and details.
#[derive(Debug)]
pub struct Error {
    /// Classification of the error
    pub kind: ErrorKind,

    /// Details of the underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Attempts to downcast the underlying error to a concrete type.
    ///
    /// # Example
    /// ```
    /// let error = Error::from(io_error);
    ///
    /// if let Some(io_err) = error.downcast::<std::io::Error>() {
    ///     println!("IO error kind: {:?}", io_err.kind());
    /// }
    /// ```
    #[must_use]
    pub fn downcast<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    /// Whether the transport may try the same request again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Standard result type for sunnify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories of the metadata subsystem.
#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// Connection, timeout or unexpected HTTP status.
    #[error("network error")]
    Network,

    /// HTTP 429 Too Many Requests.
    #[error("rate limited")]
    RateLimited,

    /// Access denied (HTTP 401/403) or expected structure absent.
    #[error("extraction failed")]
    Extraction,

    /// Malformed link or configuration supplied by the caller.
    #[error("invalid argument specified")]
    InvalidArgument,

    /// Failure while setting up a client or building a request.
    #[error("internal error")]
    Internal,
}

impl ErrorKind {
    /// Only transient transport failures are worth another attempt.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimited)
    }
}

impl Error {
    /// Creates a new error with specified kind and details.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::new(ErrorKind::Network, "connection reset");
    /// assert_eq!(err.kind, ErrorKind::Network);
    /// ```
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            error: error.into(),
        }
    }

    /// Creates an error for transient network failures.
    ///
    /// Use when the request never produced a usable response:
    /// * Connection refused or reset
    /// * Per-call timeout elapsed
    /// * Server answered with a status other than 200, 401, 403 or 429
    pub fn network<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Network, error)
    }

    /// Creates an error for HTTP 429 responses.
    pub fn rate_limited<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::RateLimited, error)
    }

    /// Creates an error for pages that were fetched but cannot be used.
    ///
    /// Use when:
    /// * The server denied access (HTTP 401/403)
    /// * The embedded JSON payload is missing or malformed
    /// * No known schema variant matched the document
    pub fn extraction<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Extraction, error)
    }

    /// Creates an error for invalid arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::invalid_argument("Invalid Spotify playlist URL");
    /// assert_eq!(err.kind, ErrorKind::InvalidArgument);
    /// ```
    pub fn invalid_argument<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::InvalidArgument, error)
    }

    /// Creates an error for internal errors.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Internal, error)
    }
}

/// Returns the underlying error source.
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Formats the error for display, showing both kind and details.
///
/// Format: "{kind}: {details}"
///
/// # Examples
///
/// ```rust
/// let err = Error::rate_limited("HTTP 429 for https://open.spotify.com/embed/playlist/x");
/// assert!(err.to_string().starts_with("rate limited: HTTP 429"));
/// ```
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: ", self.kind)?;
        self.error.fmt(fmt)
    }
}

/// Converts IO errors, which only occur while reading configuration.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            TimedOut | ConnectionRefused | ConnectionReset | ConnectionAborted | NotConnected
            | BrokenPipe | UnexpectedEof => Self::network(err),
            PermissionDenied => Self::extraction(err),
            _ => Self::invalid_argument(err),
        }
    }
}

/// Converts HTTP client errors into appropriate error kinds.
///
/// * Builder errors -> `Internal`
/// * Decode errors -> `Extraction`
/// * Connect, timeout, body and other request errors -> `Network`
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::internal(err);
        }

        if err.is_decode() {
            return Self::extraction(err);
        }

        Self::network(err)
    }
}

/// JSON that does not decode is a payload problem, never a transient one.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::extraction(err)
    }
}

/// Converts configuration file errors to `InvalidArgument`.
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::invalid_argument(e)
    }
}

/// Converts invalid header errors to `Internal`.
impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Self::internal(e.to_string())
    }
}

/// Converts URL parsing errors to `Internal`.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::internal(e.to_string())
    }
}
