//! Client Builder
//!
//! Fluent builder for [`AuthorizationClient`].

use std::sync::Arc;
use std::time::Duration;

use crate::builders::ClientConfigBuilder;
use crate::client::AuthorizationClient;
use crate::core::{Endpoint, HttpTransport, ReqwestHttpTransport};
use crate::error::AuthError;
use crate::strategy::{AuthorizationStrategy, StrategyV1};

/// Authorization client builder.
pub struct AuthorizationClientBuilder<S: AuthorizationStrategy = StrategyV1> {
    config: ClientConfigBuilder,
    strategy: S,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl AuthorizationClientBuilder<StrategyV1> {
    /// Create new builder using the V1 strategy.
    pub fn new() -> Self {
        Self {
            config: ClientConfigBuilder::new(),
            strategy: StrategyV1,
            transport: None,
        }
    }
}

impl Default for AuthorizationClientBuilder<StrategyV1> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AuthorizationStrategy> AuthorizationClientBuilder<S> {
    /// Set authorization server base URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.url(url);
        self
    }

    /// Set request timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set User-Agent of the default transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport<T: HttpTransport + 'static>(mut self, transport: Arc<T>) -> Self {
        self.transport = Some(transport as Arc<dyn HttpTransport>);
        self
    }

    /// Use a different strategy.
    pub fn strategy<S2: AuthorizationStrategy>(self, strategy: S2) -> AuthorizationClientBuilder<S2> {
        AuthorizationClientBuilder {
            config: self.config,
            strategy,
            transport: self.transport,
        }
    }

    /// Build the client.
    pub fn build(self) -> Result<AuthorizationClient<S>, AuthError> {
        let config = self.config.build()?;
        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::from_config(&config)?),
        };
        Ok(AuthorizationClient::from_endpoint(
            self.strategy,
            Endpoint::new(config.endpoint, transport),
        ))
    }
}
