//! Token Types
//!
//! Bearer credential issued by the authorization server.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Expiry of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Absolute instant after which the credential is stale.
    At(DateTime<Utc>),
    /// Expiry is not known, as for externally issued credentials accepted by
    /// verification. Such a token is never proactively considered stale, but
    /// a rejection by the server is treated as expiry.
    Unknown,
}

impl Expiry {
    /// Build from epoch milliseconds as sent by the server.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis).map(Self::At)
    }

    /// Check whether the instant has passed.
    pub fn has_passed(&self) -> bool {
        match self {
            Self::At(at) => Utc::now() >= *at,
            Self::Unknown => false,
        }
    }
}

/// Immutable bearer credential with optional refresh credential.
#[derive(Clone)]
pub struct Token {
    credential: SecretString,
    refresh_credential: Option<SecretString>,
    expires_at: Expiry,
}

impl Token {
    /// Create new token.
    pub fn new(
        credential: impl Into<String>,
        refresh_credential: Option<String>,
        expires_at: Expiry,
    ) -> Self {
        Self {
            credential: SecretString::new(credential.into()),
            refresh_credential: refresh_credential.map(SecretString::new),
            expires_at,
        }
    }

    /// Token for an externally issued credential whose expiry is unknown.
    pub fn unverified_expiry(credential: impl Into<String>, refresh_credential: Option<String>) -> Self {
        Self::new(credential, refresh_credential, Expiry::Unknown)
    }

    /// Get credential value (for Authorization header).
    pub fn credential(&self) -> &str {
        self.credential.expose_secret()
    }

    /// Get refresh credential, if one was issued.
    pub fn refresh_credential(&self) -> Option<&str> {
        self.refresh_credential
            .as_ref()
            .map(|secret| secret.expose_secret().as_str())
    }

    pub fn expires_at(&self) -> Expiry {
        self.expires_at
    }

    /// Check if token is past its stated expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at.has_passed()
    }

    /// Whether a server rejection of this token may be explained by expiry.
    pub(crate) fn rejection_means_expiry(&self) -> bool {
        match self.expires_at {
            Expiry::At(_) => self.is_expired(),
            Expiry::Unknown => true,
        }
    }

    /// Get time until expiration.
    pub fn expires_in(&self) -> Option<std::time::Duration> {
        match self.expires_at {
            Expiry::At(at) => (at - Utc::now()).to_std().ok(),
            Expiry::Unknown => None,
        }
    }

    /// Format as Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.credential.expose_secret())
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("credential", &"[REDACTED]")
            .field(
                "refresh_credential",
                &self.refresh_credential.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
