use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};
use veil::Redact;

use crate::entity;

/// Short-lived bearer token found in embed page sessions.
#[derive(Clone, PartialEq, Eq, Redact)]
pub struct Credential {
    #[redact]
    pub token: String,
    pub expires_at: SystemTime,
}

impl Credential {
    /// Lifetime assumed when the session states no expiry at all.
    pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

    /// Reads a credential from a session object.
    ///
    /// Expiry comes from `accessTokenExpirationTimestampMs` when present,
    /// otherwise `expiresIn` seconds (default one hour) after `now`.
    #[must_use]
    pub fn from_session(session: &Map<String, Value>, now: SystemTime) -> Option<Self> {
        let token = session
            .get("accessToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())?;

        let expires_at = session
            .get("accessTokenExpirationTimestampMs")
            .and_then(Value::as_f64)
            .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
            .and_then(|since_epoch| UNIX_EPOCH.checked_add(since_epoch))
            .or_else(|| {
                let lifetime = session
                    .get("expiresIn")
                    .and_then(Value::as_f64)
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .unwrap_or(Self::DEFAULT_LIFETIME);
                now.checked_add(lifetime)
            })?;

        Some(Self {
            token: token.to_owned(),
            expires_at,
        })
    }

    /// Reads the credential out of a whole embed document.
    #[must_use]
    pub fn from_document(document: &Value, now: SystemTime) -> Option<Self> {
        entity::extract_session(document).and_then(|session| Self::from_session(session, now))
    }

    #[must_use]
    pub fn time_to_live(&self) -> Duration {
        self.expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }

    /// Whether more than `margin` remains before expiry at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: SystemTime, margin: Duration) -> bool {
        self.expires_at
            .duration_since(now)
            .is_ok_and(|remaining| remaining > margin)
    }

    /// Expiry as fractional seconds since the epoch.
    #[must_use]
    pub fn expires_at_epoch_seconds(&self) -> f64 {
        self.expires_at
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |since_epoch| since_epoch.as_secs_f64())
    }
}

/// Holds the most recently observed credential.
///
/// Refreshing is the owner's job: the cache only answers whether what it
/// holds is still usable. It is not synchronized; concurrent use needs
/// external locking.
#[derive(Clone, Debug)]
pub struct CredentialCache {
    credential: Option<Credential>,
    margin: Duration,
}

impl CredentialCache {
    #[must_use]
    pub fn new(margin: Duration) -> Self {
        Self {
            credential: None,
            margin,
        }
    }

    /// Stores the credential carried by `document`, if it has one.
    ///
    /// Returns whether a credential was found. A document without one leaves
    /// the cache untouched.
    pub fn observe(&mut self, document: &Value) -> bool {
        match Credential::from_document(document, SystemTime::now()) {
            Some(credential) => {
                debug!(
                    "cached access token valid for {}s",
                    credential.time_to_live().as_secs()
                );
                self.credential = Some(credential);
                true
            }
            None => false,
        }
    }

    /// The cached credential, unless it expires within the margin.
    #[must_use]
    pub fn valid(&self) -> Option<&Credential> {
        self.valid_at(SystemTime::now())
    }

    #[must_use]
    pub fn valid_at(&self, now: SystemTime) -> Option<&Credential> {
        self.credential
            .as_ref()
            .filter(|credential| credential.is_valid_at(now, self.margin))
    }

    /// Whatever was cached last, valid or not.
    #[must_use]
    pub fn current(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn clear(&mut self) {
        self.credential = None;
    }
}
