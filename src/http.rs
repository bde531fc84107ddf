//! HTTP transport with rate limiting, status classification and retries.
//!
//! This module provides a wrapper around `reqwest::Client` that adds:
//! * Request rate limiting so pagination never floods the site
//! * Classification of responses into [`ErrorKind`]s
//! * Exponential back-off retries for transient failures
//! * Consistent timeouts and headers
//!
//! # Status Classification
//!
//! | Response           | Outcome                      | Retried |
//! |--------------------|------------------------------|---------|
//! | 200                | body                         | -       |
//! | 429                | [`ErrorKind::RateLimited`]   | yes     |
//! | 401, 403           | [`ErrorKind::Extraction`]    | no      |
//! | any other status   | [`ErrorKind::Network`]       | yes     |
//! | connect / timeout  | [`ErrorKind::Network`]       | yes     |
//!
//! # Retry Policy
//!
//! Up to `max_attempts` calls are made. After a retryable failure the client
//! sleeps `backoff_factor * 2^attempt` seconds (1s, 2s with the defaults)
//! before trying again, but never longer than 60s per sleep. No sleep follows
//! the final attempt; its error is returned as is.
//!
//! # Example
//!
//! ```rust
//! use sunnify::{config::Config, http::Client};
//!
//! let client = Client::new(&Config::default())?;
//! let html = client.get_text(url, HeaderMap::new()).await?;
//! ```

use std::{future::Future, num::NonZeroU32, time::Duration};

use exponential_backoff::Backoff;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE},
    StatusCode, Url,
};
use serde::Deserialize;

use crate::{
    config::Config,
    error::{Error, ErrorKind, Result},
    protocol,
};

/// HTTP client with built-in rate limiting and retries.
pub struct Client {
    /// Unlimited request client for special cases.
    ///
    /// Direct access to underlying client without rate limiting.
    pub unlimited: reqwest::Client,

    /// Rate limiter throttling own requests.
    rate_limiter: DefaultDirectRateLimiter,

    /// Delay schedule between attempts.
    backoff: Backoff,
}

impl Client {
    /// Rolling window for the own-request rate limit.
    const RATE_LIMIT_INTERVAL: Duration = Duration::from_secs(1);

    /// Maximum calls within each window.
    ///
    /// Supplementary track pages are fetched one by one, so this caps how
    /// fast a large playlist is walked.
    const RATE_LIMIT_CALLS_PER_INTERVAL: u8 = 10;

    /// Duration to keep idle connections alive.
    const KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Upper bound for a single back-off sleep.
    ///
    /// Only reached with a large `backoff_factor` or `max_attempts`.
    const MAX_BACKOFF: Duration = Duration::from_secs(60);

    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * The configuration is invalid
    /// * HTTP client creation fails
    ///
    /// # Panics
    ///
    /// Panics if rate limit parameters are zero.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        // Not having `Accept-Language` set is non-fatal.
        let mut headers = HeaderMap::new();
        if let Ok(lang) = HeaderValue::from_str(&config.app_lang) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }

        let http_client = reqwest::Client::builder()
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent);

        let replenish_interval =
            Self::RATE_LIMIT_INTERVAL / u32::from(Self::RATE_LIMIT_CALLS_PER_INTERVAL);
        let quota = Quota::with_period(replenish_interval)
            .expect("quota time interval is zero")
            .allow_burst(
                NonZeroU32::new(Self::RATE_LIMIT_CALLS_PER_INTERVAL.into())
                    .expect("calls per interval is zero"),
            );

        // Deterministic delays: 1s, 2s, 4s... for a factor of one second.
        let mut backoff = Backoff::new(
            config.max_attempts,
            config.initial_backoff(),
            Self::MAX_BACKOFF,
        );
        backoff.set_factor(2);
        backoff.set_jitter(0.0);

        Ok(Self {
            unlimited: http_client.build()?,
            rate_limiter: governor::RateLimiter::direct(quota),
            backoff,
        })
    }

    /// Fetches `url` and returns the body as text, retrying transient
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt if every attempt failed, or the
    /// first non-retryable error.
    pub async fn get_text(&self, url: Url, headers: HeaderMap) -> Result<String> {
        self.with_retry(url.as_str(), || self.fetch_once(&url, &headers))
            .await
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// A body that does not decode is an [`ErrorKind::Extraction`] and is
    /// not retried.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails as in [`get_text`](Self::get_text)
    /// or the body is not a valid `T`.
    pub async fn get_json<T>(&self, url: Url, headers: HeaderMap) -> Result<T>
    where
        T: for<'de> Deserialize<'de> + std::fmt::Debug,
    {
        let origin = url.path().to_owned();
        let body = self.get_text(url, headers).await?;
        protocol::json(&body, &origin)
    }

    /// Performs a single, unretried GET and reports the status code.
    ///
    /// # Errors
    ///
    /// Returns error if no response was received at all.
    pub async fn probe(&self, url: Url) -> Result<StatusCode> {
        self.rate_limiter.until_ready().await;
        let response = self.unlimited.get(url).send().await?;
        Ok(response.status())
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the last error seen.
    pub async fn with_retry<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for (attempt, delay) in (&self.backoff).into_iter().enumerate() {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => match delay {
                    Some(delay) => {
                        warn!(
                            "{what}: attempt {} failed ({e}); retrying in {:.1}s",
                            attempt + 1,
                            delay.as_secs_f32()
                        );
                        tokio::time::sleep(delay).await;
                        last_error = Some(e);
                    }
                    None => {
                        warn!("{what}: giving up after {} attempts ({e})", attempt + 1);
                        return Err(e);
                    }
                },
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal(format!("{what}: no attempt was made"))))
    }

    /// One throttled GET with status classification.
    async fn fetch_once(&self, url: &Url, headers: &HeaderMap) -> Result<String> {
        self.rate_limiter.until_ready().await;

        debug!("GET {url}");
        let response = self
            .unlimited
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        Self::classify(response.status(), url)?;
        response.text().await.map_err(Into::into)
    }

    /// Maps a status code onto the transport's error taxonomy.
    ///
    /// # Errors
    ///
    /// Returns error for every status except 200.
    pub fn classify(status: StatusCode, url: &Url) -> Result<()> {
        let kind = match status {
            StatusCode::OK => return Ok(()),
            StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Extraction,
            _ => ErrorKind::Network,
        };

        Err(Error::new(kind, format!("HTTP {} for {url}", status.as_u16())))
    }
}
