//! Authorization Strategies
//!
//! Wire protocols for talking to a specific version of the authorization
//! server API.
//!
//! Every strategy implements [`AuthorizationStrategy`]. Exchanging a refresh
//! credential is a separate capability, [`RefreshStrategy`], which a strategy
//! exposes through [`AuthorizationStrategy::refresh_capability`] only when its
//! protocol version supports it.
//!
//! A non-success status from the server is an absent result (`Ok(None)` or
//! `Ok(false)`), never an error. Errors are reserved for transport and
//! protocol faults.

pub mod mock;
pub mod v1;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::Endpoint;
use crate::error::{AuthResult, TransportError};
use crate::types::{Principal, Token, UserDetails};

pub use mock::{create_mock_strategy, MockStrategy};
pub use v1::StrategyV1;

/// Authorization strategy interface.
#[async_trait]
pub trait AuthorizationStrategy: Send + Sync {
    /// Exchange a principal for a token. `None` requests administrator
    /// authorization for trusted callers.
    async fn authorize(
        &self,
        endpoint: &Endpoint,
        principal: Option<&Principal>,
    ) -> AuthResult<Option<Token>>;

    /// Fetch the user details of the token owner. `None` means the credential
    /// was rejected.
    async fn fetch_user_details(
        &self,
        endpoint: &Endpoint,
        token: &Token,
    ) -> AuthResult<Option<UserDetails>>;

    /// Fetch the state of a permission node. `Some(false)` is a denial;
    /// `None` means the credential was rejected and the answer is unknown.
    async fn fetch_node_state(
        &self,
        endpoint: &Endpoint,
        token: &Token,
        node: &str,
    ) -> AuthResult<Option<bool>>;

    /// Check whether an externally issued credential is valid.
    async fn verify_token(&self, endpoint: &Endpoint, credential: &str) -> AuthResult<bool>;

    /// Refresh-credential exchange, if this protocol version supports it.
    fn refresh_capability(&self) -> Option<&dyn RefreshStrategy> {
        None
    }
}

/// Refresh-credential exchange capability.
#[async_trait]
pub trait RefreshStrategy: Send + Sync {
    /// Exchange a refresh credential for a new token.
    async fn refresh(
        &self,
        endpoint: &Endpoint,
        refresh_credential: &str,
    ) -> AuthResult<Option<Token>>;
}

/// Turn a bad status into an absent result; propagate every other fault.
pub(crate) fn absent_on_bad_status(
    result: Result<Value, TransportError>,
) -> AuthResult<Option<Value>> {
    match result {
        Ok(body) => Ok(Some(body)),
        Err(TransportError::BadStatus { .. }) => Ok(None),
        Err(error) => Err(error.into()),
    }
}
