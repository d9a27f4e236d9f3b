//! Authorization Client
//!
//! Entry point binding an authorization server endpoint to a strategy; the
//! factory for [`Session`]s.

use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

use crate::builders::AuthorizationClientBuilder;
use crate::core::{Endpoint, HttpTransport, ReqwestHttpTransport};
use crate::error::AuthResult;
use crate::session::{Provenance, Session};
use crate::strategy::{AuthorizationStrategy, StrategyV1};
use crate::types::{ClientConfig, Principal, Token};

/// Authorization client that authorizes principals and wraps credentials
/// into sessions.
pub struct AuthorizationClient<S: AuthorizationStrategy = StrategyV1> {
    strategy: Arc<S>,
    endpoint: Endpoint,
}

impl AuthorizationClient<StrategyV1> {
    /// Create a client using the reqwest transport and the V1 strategy.
    pub fn new(config: ClientConfig) -> AuthResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::from_config(&config)?);
        Ok(Self::from_endpoint(
            StrategyV1,
            Endpoint::new(config.endpoint, transport),
        ))
    }

    /// Create a client builder.
    pub fn builder() -> AuthorizationClientBuilder {
        AuthorizationClientBuilder::new()
    }
}

impl<S: AuthorizationStrategy> AuthorizationClient<S> {
    /// Create a client with custom components.
    pub fn with_components<T: HttpTransport + 'static>(
        base_url: impl Into<String>,
        strategy: S,
        transport: Arc<T>,
    ) -> Self {
        Self::from_endpoint(strategy, Endpoint::new(base_url, transport))
    }

    pub(crate) fn from_endpoint(strategy: S, endpoint: Endpoint) -> Self {
        Self {
            strategy: Arc::new(strategy),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    fn session(&self, provenance: Provenance, token: Option<Token>) -> Session<S> {
        Session::new(self.strategy.clone(), self.endpoint.clone(), provenance, token)
    }

    /// Initialize an administrator session.
    ///
    /// The server grants these only to trusted callers (by address). The
    /// session may re-authorize without a principal when it goes stale.
    pub async fn authorize_trusted(&self) -> AuthResult<Session<S>> {
        let token = self.strategy.authorize(&self.endpoint, None).await?;
        debug!(authorized = token.is_some(), "administrator session created");
        Ok(self.session(Provenance::Trusted, token))
    }

    /// Initialize a session with a custom principal, kept for re-authorization.
    pub async fn authorize(&self, principal: Principal) -> AuthResult<Session<S>> {
        let token = self
            .strategy
            .authorize(&self.endpoint, Some(&principal))
            .await?;
        debug!(authorized = token.is_some(), "principal session created");
        Ok(self.session(Provenance::Principal(principal), token))
    }

    /// Initialize a session with username/password credentials.
    pub async fn authorize_credentials(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> AuthResult<Session<S>> {
        self.authorize(Principal::credentials(username, password))
            .await
    }

    /// Verify an externally issued credential and wrap it in a session.
    ///
    /// An invalid credential yields an unauthorized session. The token has
    /// no known expiry; the session can only be refreshed when a refresh
    /// credential is supplied.
    pub async fn verify(
        &self,
        credential: impl Into<String>,
        refresh_credential: Option<String>,
    ) -> AuthResult<Session<S>> {
        let credential = credential.into();
        let provenance = match &refresh_credential {
            Some(refresh) => Provenance::TokenWithRefresh(SecretString::new(refresh.clone())),
            None => Provenance::TokenOnly,
        };

        let valid = self.strategy.verify_token(&self.endpoint, &credential).await?;
        debug!(valid, "verified external credential");

        let token = valid.then(|| Token::unverified_expiry(credential, refresh_credential));
        Ok(self.session(provenance, token))
    }

    /// Create a session from a refresh credential alone and refresh it once.
    ///
    /// A rejected refresh credential yields an unauthorized session.
    pub async fn refresh(&self, refresh_credential: impl Into<String>) -> AuthResult<Session<S>> {
        let provenance = Provenance::TokenWithRefresh(SecretString::new(refresh_credential.into()));
        let session = self.session(provenance, None);
        session.refresh().await?;
        debug!(authorized = session.authorized(), "refresh session created");
        Ok(session)
    }
}

impl<S: AuthorizationStrategy> Clone for AuthorizationClient<S> {
    fn clone(&self) -> Self {
        Self {
            strategy: self.strategy.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Create a client with the default transport and strategy.
pub fn authorization_client(config: ClientConfig) -> AuthResult<AuthorizationClient> {
    AuthorizationClient::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::client_config;
    use crate::core::MockHttpTransport;
    use crate::error::AuthError;
    use crate::strategy::MockStrategy;
    use crate::types::{Expiry, UserDetails};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn token(credential: &str, refresh: Option<&str>, offset_ms: i64) -> Token {
        Token::new(
            credential,
            refresh.map(str::to_string),
            Expiry::At(Utc::now() + Duration::milliseconds(offset_ms)),
        )
    }

    fn client(strategy: MockStrategy) -> AuthorizationClient<MockStrategy> {
        AuthorizationClient::with_components(
            "https://auth.example.com",
            strategy,
            Arc::new(MockHttpTransport::new()),
        )
    }

    #[test]
    fn test_client_creation() {
        let config = client_config().url("https://auth.example.com").build().unwrap();
        let client = AuthorizationClient::new(config).unwrap();
        assert_eq!(client.endpoint().base_url(), "https://auth.example.com");
    }

    #[tokio::test]
    async fn test_authorize_credentials_then_node_state() {
        let strategy = MockStrategy::new();
        strategy
            .queue_authorize(Some(token("T1", Some("R1"), 1000)))
            .grant("admin.fly");
        let client = client(strategy);

        let session = client.authorize_credentials("a", "b").await.unwrap();
        assert!(session.authorized());
        assert!(!session.is_trusted());
        assert!(session.fetch_node_state("admin.fly").await.unwrap());

        let strategy = client.strategy();
        assert_eq!(
            strategy.get_authorize_history(),
            vec![Some(json!({"username": "a", "password": "b"}))]
        );
        assert!(strategy.get_refresh_history().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_refreshes_through_refresh_credential() {
        let strategy = MockStrategy::new();
        strategy
            .queue_authorize(Some(token("T1", Some("R1"), -1)))
            .queue_refresh(Some(token("T2", Some("R2"), 1000)))
            .grant("admin.fly")
            .revoke("T1");
        let client = client(strategy);

        let session = client.authorize_credentials("a", "b").await.unwrap();
        assert!(session.fetch_node_state("admin.fly").await.unwrap());

        assert_eq!(client.strategy().get_refresh_history(), vec!["R1"]);
        assert_eq!(client.strategy().get_authorize_history().len(), 1);
        assert_eq!(session.token().unwrap().credential(), "T2");
    }

    #[tokio::test]
    async fn test_trusted_session() {
        let strategy = MockStrategy::new();
        strategy
            .queue_authorize(Some(token("ADMIN1", None, 1000)))
            .queue_authorize(Some(token("ADMIN2", None, 1000)));
        let client = client(strategy);

        let session = client.authorize_trusted().await.unwrap();
        assert!(session.is_trusted());
        assert!(session.is_refreshable());

        session.refresh().await.unwrap();
        assert_eq!(client.strategy().get_authorize_history(), vec![None, None]);
        assert_eq!(session.token().unwrap().credential(), "ADMIN2");
    }

    #[tokio::test]
    async fn test_rejected_principal_gives_unauthorized_session() {
        let strategy = MockStrategy::new();
        strategy.queue_authorize(None);
        let client = client(strategy);

        let session = client.authorize_credentials("a", "wrong").await.unwrap();
        assert!(!session.authorized());
        assert!(session.is_refreshable());
    }

    #[tokio::test]
    async fn test_verify_round_trip() {
        let strategy = MockStrategy::new();
        strategy
            .queue_authorize(Some(token("T1", Some("R1"), 1000)))
            .set_user_details(UserDetails {
                permissions_included: true,
                permissions: vec!["admin.fly".to_string()],
                id: Some("1".to_string()),
                primary_group: None,
                username: Some("a".to_string()),
            });
        let client = client(strategy);

        let issued = client.authorize_credentials("a", "b").await.unwrap();
        let credential = issued.valid_credential().await.unwrap();

        let verified = client.verify(credential, None).await.unwrap();
        assert!(verified.authorized());
        assert!(!verified.is_refreshable());
        let details = verified.fetch_user_details().await.unwrap();
        assert_eq!(details.username, Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_verify_invalid_credential() {
        let client = client(MockStrategy::new());

        let session = client.verify("forged", None).await.unwrap();
        assert!(!session.authorized());
        assert!(matches!(
            session.fetch_user_details().await,
            Err(AuthError::Unauthorized(_))
        ));
        assert_eq!(client.strategy().get_verify_history(), vec!["forged"]);
    }

    #[tokio::test]
    async fn test_verify_with_refresh_credential() {
        let strategy = MockStrategy::new();
        strategy
            .accept("EXT")
            .queue_refresh(Some(token("T2", None, 1000)));
        let client = client(strategy);

        let session = client.verify("EXT", Some("R1".to_string())).await.unwrap();
        assert!(session.is_refreshable());
        assert_eq!(session.token().unwrap().refresh_credential(), Some("R1"));

        session.refresh().await.unwrap();
        assert_eq!(client.strategy().get_refresh_history(), vec!["R1"]);
        assert_eq!(session.token().unwrap().credential(), "T2");
    }

    #[tokio::test]
    async fn test_verify_without_refresh_cannot_refresh() {
        let strategy = MockStrategy::new();
        strategy.accept("EXT");
        let client = client(strategy);

        let session = client.verify("EXT", None).await.unwrap();
        let calls = client.strategy().call_count();
        assert!(matches!(
            session.refresh().await,
            Err(AuthError::SessionNotRefreshable)
        ));
        assert_eq!(client.strategy().call_count(), calls);
    }

    #[tokio::test]
    async fn test_refresh_session() {
        let strategy = MockStrategy::new();
        strategy.queue_refresh(Some(token("T2", Some("R2"), 1000)));
        let client = client(strategy);

        let session = client.refresh("R1").await.unwrap();
        assert!(session.authorized());
        assert_eq!(session.token().unwrap().refresh_credential(), Some("R2"));
    }

    #[tokio::test]
    async fn test_refresh_session_rejected_is_not_a_fault() {
        let strategy = MockStrategy::new();
        strategy.queue_refresh(None);
        let client = client(strategy);

        let session = client.refresh("R-revoked").await.unwrap();
        assert!(!session.authorized());
        assert!(matches!(
            session.fetch_node_state("admin.fly").await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_fault_during_authorize() {
        let strategy = MockStrategy::new();
        strategy.fail_next_with_transport_fault();
        let client = client(strategy);

        let result = client.authorize_credentials("a", "b").await;
        assert!(matches!(result, Err(AuthError::Transport(_))));
    }
}
