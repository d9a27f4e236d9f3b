//! Configuration Types
//!
//! Authorization client configuration.

use std::time::Duration;

use crate::builders::ClientConfigBuilder;
use crate::error::{AuthResult, ConfigurationError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default maximum response body size (1MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1_048_576;

/// Authorization client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the authorization server, without trailing slash.
    pub endpoint: String,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Responses larger than this are rejected.
    pub max_response_size: usize,
    /// Optional User-Agent header.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// `AUTHORIZATION_SERVER_URL` is required; `AUTHORIZATION_TIMEOUT_SECS` and
    /// `AUTHORIZATION_MAX_RESPONSE_BYTES` fall back to defaults.
    pub fn from_env() -> AuthResult<Self> {
        let endpoint = std::env::var("AUTHORIZATION_SERVER_URL").map_err(|_| {
            ConfigurationError::MissingField {
                field: "AUTHORIZATION_SERVER_URL".to_string(),
            }
        })?;

        let timeout_secs = std::env::var("AUTHORIZATION_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_response_size = std::env::var("AUTHORIZATION_MAX_RESPONSE_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_RESPONSE_SIZE);

        ClientConfigBuilder::new()
            .url(endpoint)
            .timeout(Duration::from_secs(timeout_secs))
            .max_response_size(max_response_size)
            .build()
    }
}
