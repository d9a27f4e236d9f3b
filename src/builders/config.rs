//! Configuration Builder
//!
//! Fluent builder for client configuration.

use std::time::Duration;
use url::Url;

use crate::error::{AuthError, ConfigurationError};
use crate::types::{ClientConfig, DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT_SECS};

/// Client configuration builder.
#[derive(Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    max_response_size: Option<usize>,
    user_agent: Option<String>,
}

impl ClientConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set authorization server base URL.
    pub fn url(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set maximum accepted response size in bytes.
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = Some(size);
        self
    }

    /// Set User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig, AuthError> {
        let endpoint = self.endpoint.ok_or_else(|| ConfigurationError::MissingField {
            field: "endpoint".to_string(),
        })?;

        let parsed = Url::parse(&endpoint).map_err(|_| ConfigurationError::InvalidEndpoint {
            url: endpoint.clone(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidEndpoint { url: endpoint }.into());
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(ClientConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            max_response_size: self.max_response_size.unwrap_or(DEFAULT_MAX_RESPONSE_SIZE),
            user_agent: self.user_agent,
        })
    }
}

/// Create a new client configuration builder.
pub fn client_config() -> ClientConfigBuilder {
    ClientConfigBuilder::new()
}
