//! Authorization Client
//!
//! Client for a remote authorization server: authorizes principals, verifies
//! externally issued credentials, and keeps the resulting sessions usable by
//! transparently refreshing or re-authorizing them when the server rejects a
//! stale token.
//!
//! # Example
//!
//! ```rust,ignore
//! use authorization_client::{client_config, AuthorizationClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = client_config()
//!         .url("https://auth.example.com")
//!         .build()?;
//!     let client = AuthorizationClient::new(config)?;
//!
//!     // Principal session: re-authorizes with the same credentials when stale
//!     let session = client.authorize_credentials("alice", "secret").await?;
//!     if session.fetch_node_state("admin.fly").await? {
//!         println!("alice may fly");
//!     }
//!
//!     // Administrator session for trusted callers
//!     let admin = client.authorize_trusted().await?;
//!     let credential = admin.valid_credential().await?;
//!
//!     // Wrap a credential received from elsewhere
//!     let verified = client.verify(credential, None).await?;
//!     println!("{:?}", verified.fetch_user_details().await?.username);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: tokens, principals, user details and client configuration
//! - `error`: error hierarchy separating authorization outcomes from faults
//! - `core`: HTTP transport abstraction and the server endpoint
//! - `strategy`: protocol strategies (wire format of a server version)
//! - `session`: session state machine with refresh-and-retry
//! - `client`: session factory
//! - `builders`: fluent builders for configuration and clients
//! - `guard`: bearer header authentication with path-mapped permission nodes

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod guard;
pub mod session;
pub mod strategy;
pub mod types;

// Re-export main client
pub use client::{authorization_client, AuthorizationClient};

// Re-export builders
pub use builders::{client_config, AuthorizationClientBuilder, ClientConfigBuilder};

// Re-export session
pub use session::{Provenance, Session};

// Re-export strategies
pub use strategy::{
    create_mock_strategy, AuthorizationStrategy, MockStrategy, RefreshStrategy, StrategyV1,
};

// Re-export guard
pub use guard::{parse_bearer, Authentication, BearerGuard, PathPattern, PermissionMapping};

// Re-export core
pub use core::{
    create_mock_transport, Endpoint, HttpMethod, HttpRequest, HttpTransport, MockHttpTransport,
    MockResponse, ReqwestHttpTransport,
};

// Re-export types
pub use types::{
    ClientConfig, Expiry, Principal, Token, UserDetails, DEFAULT_MAX_RESPONSE_SIZE,
    DEFAULT_TIMEOUT_SECS,
};

// Re-export errors
pub use error::{
    get_user_message, AuthError, AuthResult, ConfigurationError, ProtocolError, TransportError,
    UnauthorizedError,
};
