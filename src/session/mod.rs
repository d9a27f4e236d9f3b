//! Authorization Session
//!
//! A session owns one credential lineage: the current token plus the
//! provenance needed to renew it. Staleness is detected lazily, when the
//! server rejects a call made with an expired token; the session then
//! refreshes and retries that call exactly once.
//!
//! A session can be shared between tasks. All operations that may refresh
//! run under a single async gate, so a stale token is never refreshed twice
//! concurrently and a newer token is never overwritten by an older result.

pub mod provenance;

pub use provenance::Provenance;

use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::core::Endpoint;
use crate::error::{AuthError, AuthResult, UnauthorizedError};
use crate::strategy::{AuthorizationStrategy, StrategyV1};
use crate::types::{Token, UserDetails};

/// Authorization session, authorized or not.
pub struct Session<S: AuthorizationStrategy = StrategyV1> {
    strategy: Arc<S>,
    endpoint: Endpoint,
    provenance: Provenance,
    token: RwLock<Option<Token>>,
    gate: Mutex<()>,
}

impl<S: AuthorizationStrategy> Session<S> {
    pub(crate) fn new(
        strategy: Arc<S>,
        endpoint: Endpoint,
        provenance: Provenance,
        token: Option<Token>,
    ) -> Self {
        Self {
            strategy,
            endpoint,
            provenance,
            token: RwLock::new(token),
            gate: Mutex::new(()),
        }
    }

    /// Returns true if the session currently holds a credential.
    ///
    /// Never refreshes and never calls the server.
    pub fn authorized(&self) -> bool {
        self.token.read().is_some()
    }

    /// Snapshot of the current token.
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Returns true for administrator sessions.
    pub fn is_trusted(&self) -> bool {
        self.provenance.is_trusted()
    }

    /// Whether `refresh` has any way to obtain a new token.
    pub fn is_refreshable(&self) -> bool {
        self.can_refresh(self.token().as_ref())
    }

    /// Refresh the session.
    ///
    /// A refresh credential, when present and supported by the strategy, is
    /// exchanged first. Only when that is unavailable or rejected does a
    /// principal or trusted session re-authorize. Fails with
    /// [`AuthError::SessionNotRefreshable`] without calling the server when
    /// neither path exists. A rejected refresh leaves the session
    /// unauthorized rather than failing.
    #[instrument(skip(self), fields(provenance = self.provenance.kind()))]
    pub async fn refresh(&self) -> AuthResult<()> {
        let _gate = self.gate.lock().await;
        self.refresh_locked().await
    }

    /// Fetch the user details of the session owner.
    #[instrument(skip(self), fields(provenance = self.provenance.kind()))]
    pub async fn fetch_user_details(&self) -> AuthResult<UserDetails> {
        let strategy = self.strategy.as_ref();
        let endpoint = &self.endpoint;
        self.authorized_fetch("user details", |token| async move {
            strategy.fetch_user_details(endpoint, &token).await
        })
        .await
    }

    /// Fetch the state of a permission node: true if the user holds it.
    #[instrument(skip(self), fields(provenance = self.provenance.kind()))]
    pub async fn fetch_node_state(&self, node: &str) -> AuthResult<bool> {
        let strategy = self.strategy.as_ref();
        let endpoint = &self.endpoint;
        self.authorized_fetch("node state", |token| async move {
            strategy.fetch_node_state(endpoint, &token, node).await
        })
        .await
    }

    /// Get a credential that is not past its stated expiry, refreshing once
    /// if needed.
    #[instrument(skip(self), fields(provenance = self.provenance.kind()))]
    pub async fn valid_credential(&self) -> AuthResult<String> {
        let _gate = self.gate.lock().await;

        let token = self.current()?;
        if !token.is_expired() {
            return Ok(token.credential().to_string());
        }

        if !self.can_refresh(Some(&token)) {
            return Err(UnauthorizedError::SessionExpired.into());
        }
        debug!("credential expired, refreshing before use");
        self.refresh_locked().await?;

        let token = self.current()?;
        if token.is_expired() {
            return Err(AuthError::inconsistent(
                "server issued a credential that is already expired",
            ));
        }
        Ok(token.credential().to_string())
    }

    fn current(&self) -> AuthResult<Token> {
        self.token()
            .ok_or_else(|| UnauthorizedError::NoCredential.into())
    }

    fn set_token(&self, token: Option<Token>) {
        *self.token.write() = token;
    }

    fn refresh_credential(&self, token: Option<&Token>) -> Option<String> {
        self.strategy.refresh_capability()?;
        let refresh_credential = match token {
            Some(token) => token.refresh_credential(),
            None => self.provenance.initial_refresh_credential(),
        };
        refresh_credential.map(str::to_owned)
    }

    fn can_refresh(&self, token: Option<&Token>) -> bool {
        self.refresh_credential(token).is_some() || self.provenance.reauthorization().is_some()
    }

    /// Refresh body; the caller holds the gate.
    async fn refresh_locked(&self) -> AuthResult<()> {
        let current = self.token();
        let refresh_credential = self.refresh_credential(current.as_ref());
        let reauthorization = self.provenance.reauthorization();

        if refresh_credential.is_none() && reauthorization.is_none() {
            return Err(AuthError::SessionNotRefreshable);
        }

        if let (Some(refresh_credential), Some(refresher)) =
            (refresh_credential, self.strategy.refresh_capability())
        {
            debug!("exchanging refresh credential");
            match refresher.refresh(&self.endpoint, &refresh_credential).await? {
                Some(token) => {
                    self.set_token(Some(token));
                    return Ok(());
                }
                None => debug!("refresh credential rejected"),
            }
        }

        // Only a completed exchange changes the token; faults leave it as is.
        let token = match reauthorization {
            Some(principal) => {
                debug!("re-authorizing session");
                self.strategy.authorize(&self.endpoint, principal).await?
            }
            None => None,
        };
        if token.is_none() {
            debug!("session is now unauthorized");
        }
        self.set_token(token);

        Ok(())
    }

    /// Run `fetch` with the current token, refreshing and retrying once when
    /// the server rejects an expired token.
    async fn authorized_fetch<T, F, Fut>(&self, operation: &'static str, fetch: F) -> AuthResult<T>
    where
        F: Fn(Token) -> Fut,
        Fut: Future<Output = AuthResult<Option<T>>>,
    {
        let _gate = self.gate.lock().await;

        let token = self.current()?;
        if let Some(result) = fetch(token.clone()).await? {
            return Ok(result);
        }

        // Expiry is judged when the rejection arrives, not when the call left.
        if !token.rejection_means_expiry() {
            warn!(operation, "credential rejected before its stated expiry");
            return Err(AuthError::inconsistent(format!(
                "{} rejected a credential that should still be valid",
                operation
            )));
        }

        if !self.can_refresh(Some(&token)) {
            return Err(UnauthorizedError::SessionExpired.into());
        }

        warn!(operation, "expired credential rejected, refreshing and retrying once");
        self.refresh_locked().await?;

        let token = self.current()?;
        match fetch(token).await? {
            Some(result) => Ok(result),
            None => Err(AuthError::inconsistent(format!(
                "{} rejected a freshly refreshed credential",
                operation
            ))),
        }
    }
}

impl<S: AuthorizationStrategy> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("provenance", &self.provenance)
            .field("token", &*self.token.read())
            .finish()
    }
}
