//! Session Provenance
//!
//! How a session came to exist, which decides how it may be refreshed.

use secrecy::{ExposeSecret, SecretString};

use crate::types::Principal;

/// Origin of a session's credential lineage.
#[derive(Clone)]
pub enum Provenance {
    /// Authorized with a principal, which is kept for full re-authorization.
    Principal(Principal),
    /// Administrator session from a trusted caller; re-authorizes without a principal.
    Trusted,
    /// Wraps an externally issued credential with no way to renew it.
    TokenOnly,
    /// Externally issued lineage that carries a refresh credential.
    TokenWithRefresh(SecretString),
}

impl Provenance {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Principal(_) => "principal",
            Self::Trusted => "trusted",
            Self::TokenOnly => "token_only",
            Self::TokenWithRefresh(_) => "token_with_refresh",
        }
    }

    /// Principal to re-authorize with, if full re-authorization is allowed.
    ///
    /// The outer `Option` says whether re-authorization is possible; the
    /// inner one is the principal to send (`None` for trusted sessions).
    pub(crate) fn reauthorization(&self) -> Option<Option<&Principal>> {
        match self {
            Self::Principal(principal) => Some(Some(principal)),
            Self::Trusted => Some(None),
            Self::TokenOnly | Self::TokenWithRefresh(_) => None,
        }
    }

    /// Refresh credential the lineage started with.
    pub(crate) fn initial_refresh_credential(&self) -> Option<&str> {
        match self {
            Self::TokenWithRefresh(refresh) => Some(refresh.expose_secret().as_str()),
            Self::Principal(_) | Self::Trusted | Self::TokenOnly => None,
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted)
    }
}

impl std::fmt::Debug for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Principal(principal) => f.debug_tuple("Principal").field(principal).finish(),
            Self::Trusted => f.write_str("Trusted"),
            Self::TokenOnly => f.write_str("TokenOnly"),
            Self::TokenWithRefresh(_) => f.write_str("TokenWithRefresh([REDACTED])"),
        }
    }
}
