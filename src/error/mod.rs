//! Authorization Error Types
//!
//! Error hierarchy for the session engine, strategies and transports.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the authorization client.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] UnauthorizedError),

    /// Refresh was requested but the session carries no principal, trust
    /// flag or usable refresh credential.
    #[error("Session cannot be refreshed: it was not created with a principal, trust or refresh credential")]
    SessionNotRefreshable,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The server rejected a credential that was not past its stated expiry,
    /// or rejected a freshly refreshed one.
    #[error("Inconsistent session state: {message}")]
    InternalInconsistency { message: String },
}

impl AuthError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "AUTH_CONFIG",
            Self::Unauthorized(_) => "AUTH_UNAUTHORIZED",
            Self::SessionNotRefreshable => "AUTH_NOT_REFRESHABLE",
            Self::Transport(_) => "AUTH_TRANSPORT",
            Self::Protocol(_) => "AUTH_PROTOCOL",
            Self::InternalInconsistency { .. } => "AUTH_INCONSISTENT",
        }
    }

    /// True when the underlying call never produced a usable response.
    ///
    /// These faults are not actionable through a refresh.
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol(_))
    }

    /// Check if error requires obtaining a new session.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::SessionNotRefreshable)
    }

    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            message: message.into(),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("HTTP client could not be created: {message}")]
    HttpClient { message: String },
}

/// Reasons a session query was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedError {
    #[error("Not authorized")]
    NoCredential,

    #[error("Session expired, please obtain another token")]
    SessionExpired,
}

/// Transport-level error.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with anything other than 200.
    #[error("Bad status code: {status}")]
    BadStatus { status: u16 },

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Unexpected redirect to: {location}")]
    UnexpectedRedirect { location: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },

    #[error("Invalid response body: {message}")]
    InvalidBody { message: String },
}

/// Malformed but successful response.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// Result type for authorization operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Get user-friendly error message.
pub fn get_user_message(error: &AuthError) -> String {
    match error {
        AuthError::Unauthorized(UnauthorizedError::NoCredential) => {
            "You are not signed in. Please sign in and try again.".to_string()
        }
        AuthError::Unauthorized(UnauthorizedError::SessionExpired) => {
            "Your session has expired. Please sign in again.".to_string()
        }
        AuthError::SessionNotRefreshable => {
            "Your session cannot be renewed. Please sign in again.".to_string()
        }
        AuthError::Transport(TransportError::Timeout { .. }) => {
            "The request timed out. Please check your connection and try again.".to_string()
        }
        AuthError::Transport(_) | AuthError::Protocol(_) => {
            "The authorization service is unavailable. Please try again later.".to_string()
        }
        _ => "An authorization error occurred. Please try again.".to_string(),
    }
}
