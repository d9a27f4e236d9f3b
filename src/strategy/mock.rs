//! Mock Strategy
//!
//! Scriptable in-memory strategy for testing session behaviour without a
//! transport.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use crate::core::Endpoint;
use crate::error::{AuthError, AuthResult, TransportError};
use crate::strategy::{AuthorizationStrategy, RefreshStrategy};
use crate::types::{Principal, Token, UserDetails};

#[derive(Default)]
struct MockState {
    authorize_results: VecDeque<Option<Token>>,
    refresh_results: VecDeque<Option<Token>>,
    accepted: HashSet<String>,
    granted: HashSet<String>,
    user_details: Option<UserDetails>,
    next_error: Option<AuthError>,
    next_authorize_error: Option<AuthError>,
    latency: Option<Duration>,
    authorize_history: Vec<Option<Value>>,
    refresh_history: Vec<String>,
    user_details_history: Vec<String>,
    node_state_history: Vec<(String, String)>,
    verify_history: Vec<String>,
}

/// Mock strategy for testing.
///
/// Behaves like a tiny authorization server: tokens handed out by queued
/// authorize/refresh results are accepted until revoked, and queries on an
/// unaccepted credential return an absent result.
pub struct MockStrategy {
    state: Mutex<MockState>,
    supports_refresh: bool,
}

impl Default for MockStrategy {
    fn default() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            supports_refresh: true,
        }
    }
}

impl MockStrategy {
    /// Create new mock strategy with refresh support.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose protocol version cannot exchange refresh credentials.
    pub fn without_refresh() -> Self {
        Self {
            supports_refresh: false,
            ..Self::default()
        }
    }

    /// Queue the result of the next authorize call. Issued credentials are accepted.
    pub fn queue_authorize(&self, token: Option<Token>) -> &Self {
        let mut state = self.state.lock();
        if let Some(token) = &token {
            state.accepted.insert(token.credential().to_string());
        }
        state.authorize_results.push_back(token);
        self
    }

    /// Queue the result of the next refresh call. Issued credentials are accepted.
    pub fn queue_refresh(&self, token: Option<Token>) -> &Self {
        let mut state = self.state.lock();
        if let Some(token) = &token {
            state.accepted.insert(token.credential().to_string());
        }
        state.refresh_results.push_back(token);
        self
    }

    /// Accept a credential that was issued elsewhere.
    pub fn accept(&self, credential: &str) -> &Self {
        self.state.lock().accepted.insert(credential.to_string());
        self
    }

    /// Reject a credential from now on.
    pub fn revoke(&self, credential: &str) -> &Self {
        self.state.lock().accepted.remove(credential);
        self
    }

    /// Grant a permission node to every accepted credential.
    pub fn grant(&self, node: &str) -> &Self {
        self.state.lock().granted.insert(node.to_string());
        self
    }

    /// Set user details returned for accepted credentials.
    pub fn set_user_details(&self, details: UserDetails) -> &Self {
        self.state.lock().user_details = Some(details);
        self
    }

    /// Fail the next call with a transport fault.
    pub fn fail_next_with_transport_fault(&self) -> &Self {
        self.state.lock().next_error = Some(AuthError::Transport(TransportError::ConnectionFailed {
            message: "mock transport fault".to_string(),
        }));
        self
    }

    /// Fail the next authorize call with a transport fault, leaving other
    /// calls unaffected.
    pub fn fail_next_authorize_with_transport_fault(&self) -> &Self {
        self.state.lock().next_authorize_error =
            Some(AuthError::Transport(TransportError::ConnectionFailed {
                message: "mock transport fault".to_string(),
            }));
        self
    }

    /// Delay every user details and node state answer by `latency`.
    pub fn with_latency(&self, latency: Duration) -> &Self {
        self.state.lock().latency = Some(latency);
        self
    }

    /// Principals passed to authorize, in call order.
    pub fn get_authorize_history(&self) -> Vec<Option<Value>> {
        self.state.lock().authorize_history.clone()
    }

    /// Refresh credentials passed to refresh, in call order.
    pub fn get_refresh_history(&self) -> Vec<String> {
        self.state.lock().refresh_history.clone()
    }

    /// Credentials used for user details fetches.
    pub fn get_user_details_history(&self) -> Vec<String> {
        self.state.lock().user_details_history.clone()
    }

    /// (credential, node) pairs used for node state fetches.
    pub fn get_node_state_history(&self) -> Vec<(String, String)> {
        self.state.lock().node_state_history.clone()
    }

    /// Credentials passed to verify.
    pub fn get_verify_history(&self) -> Vec<String> {
        self.state.lock().verify_history.clone()
    }

    /// Total number of strategy calls, i.e. calls that would hit the transport.
    pub fn call_count(&self) -> usize {
        let state = self.state.lock();
        state.authorize_history.len()
            + state.refresh_history.len()
            + state.user_details_history.len()
            + state.node_state_history.len()
            + state.verify_history.len()
    }

    async fn simulate_latency(&self) {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn check_error(&self) -> AuthResult<()> {
        match self.state.lock().next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthorizationStrategy for MockStrategy {
    async fn authorize(
        &self,
        _endpoint: &Endpoint,
        principal: Option<&Principal>,
    ) -> AuthResult<Option<Token>> {
        self.check_error()?;
        let mut state = self.state.lock();
        if let Some(error) = state.next_authorize_error.take() {
            return Err(error);
        }
        state
            .authorize_history
            .push(principal.map(|p| p.as_json().clone()));
        Ok(state.authorize_results.pop_front().flatten())
    }

    async fn fetch_user_details(
        &self,
        _endpoint: &Endpoint,
        token: &Token,
    ) -> AuthResult<Option<UserDetails>> {
        self.check_error()?;
        self.simulate_latency().await;
        let mut state = self.state.lock();
        state
            .user_details_history
            .push(token.credential().to_string());
        if !state.accepted.contains(token.credential()) {
            return Ok(None);
        }
        Ok(Some(state.user_details.clone().unwrap_or(UserDetails {
            permissions_included: true,
            permissions: state.granted.iter().cloned().collect(),
            id: None,
            primary_group: None,
            username: None,
        })))
    }

    async fn fetch_node_state(
        &self,
        _endpoint: &Endpoint,
        token: &Token,
        node: &str,
    ) -> AuthResult<Option<bool>> {
        self.check_error()?;
        self.simulate_latency().await;
        let mut state = self.state.lock();
        state
            .node_state_history
            .push((token.credential().to_string(), node.to_string()));
        if !state.accepted.contains(token.credential()) {
            return Ok(None);
        }
        Ok(Some(state.granted.contains(node)))
    }

    async fn verify_token(&self, _endpoint: &Endpoint, credential: &str) -> AuthResult<bool> {
        self.check_error()?;
        let mut state = self.state.lock();
        state.verify_history.push(credential.to_string());
        Ok(state.accepted.contains(credential))
    }

    fn refresh_capability(&self) -> Option<&dyn RefreshStrategy> {
        if self.supports_refresh {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl RefreshStrategy for MockStrategy {
    async fn refresh(
        &self,
        _endpoint: &Endpoint,
        refresh_credential: &str,
    ) -> AuthResult<Option<Token>> {
        self.check_error()?;
        let mut state = self.state.lock();
        state.refresh_history.push(refresh_credential.to_string());
        Ok(state.refresh_results.pop_front().flatten())
    }
}

/// Create mock strategy for testing.
pub fn create_mock_strategy() -> MockStrategy {
    MockStrategy::new()
}
