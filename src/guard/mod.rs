//! Bearer Guard
//!
//! Framework-agnostic request authentication: turns an inbound
//! `Authorization: Bearer …` header into a verified session, its user
//! details, and the outcome of any permission nodes mapped to the request
//! path.

pub mod pattern;

pub use pattern::PathPattern;

use tracing::debug;

use crate::client::AuthorizationClient;
use crate::error::AuthResult;
use crate::session::Session;
use crate::strategy::{AuthorizationStrategy, StrategyV1};
use crate::types::UserDetails;

/// Permission nodes required by request path patterns.
#[derive(Clone, Debug, Default)]
pub struct PermissionMapping {
    mapping: Vec<(PathPattern, String)>,
}

impl PermissionMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `node` for paths matching `pattern`.
    pub fn path(mut self, pattern: &str, node: impl Into<String>) -> AuthResult<Self> {
        self.mapping.push((PathPattern::new(pattern)?, node.into()));
        Ok(self)
    }

    /// Nodes required for `path`, in registration order.
    pub fn nodes_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.mapping
            .iter()
            .filter(move |(pattern, _)| pattern.matches(path))
            .map(|(_, node)| node.as_str())
    }
}

/// Successfully authenticated request.
#[derive(Debug)]
pub struct Authentication<S: AuthorizationStrategy = StrategyV1> {
    pub session: Session<S>,
    pub details: UserDetails,
}

impl<S: AuthorizationStrategy> Authentication<S> {
    /// Principal name: the username of the authenticated user.
    pub fn name(&self) -> Option<&str> {
        self.details.username.as_deref()
    }
}

/// Extract the credential from an `Authorization` header value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
}

/// Authenticates requests carrying bearer credentials.
pub struct BearerGuard<S: AuthorizationStrategy = StrategyV1> {
    client: AuthorizationClient<S>,
    permissions: PermissionMapping,
    ignored_paths: Vec<PathPattern>,
}

impl<S: AuthorizationStrategy> BearerGuard<S> {
    pub fn new(client: AuthorizationClient<S>) -> Self {
        Self {
            client,
            permissions: PermissionMapping::new(),
            ignored_paths: Vec::new(),
        }
    }

    /// Set the permission nodes required per path.
    pub fn with_permissions(mut self, permissions: PermissionMapping) -> Self {
        self.permissions = permissions;
        self
    }

    /// Exempt paths matching `pattern` from authentication.
    pub fn ignore_path(mut self, pattern: &str) -> AuthResult<Self> {
        self.ignored_paths.push(PathPattern::new(pattern)?);
        Ok(self)
    }

    /// Whether an unauthenticated request to `path` must be refused.
    pub fn requires_authentication(&self, path: &str) -> bool {
        !self.ignored_paths.iter().any(|pattern| pattern.matches(path))
    }

    /// Authenticate a request.
    ///
    /// Returns `Ok(None)` when the header is missing or malformed, the
    /// credential is invalid or rejected, or a mapped permission node is not
    /// held. Transport, protocol and inconsistency faults are returned as
    /// errors.
    pub async fn authenticate(
        &self,
        authorization_header: Option<&str>,
        path: &str,
    ) -> AuthResult<Option<Authentication<S>>> {
        let Some(credential) = authorization_header.and_then(parse_bearer) else {
            return Ok(None);
        };

        let session = self.client.verify(credential, None).await?;
        if !session.authorized() {
            debug!(path, "bearer credential failed verification");
            return Ok(None);
        }

        let details = match session.fetch_user_details().await {
            Ok(details) => details,
            Err(error) if error.needs_reauth() => return Ok(None),
            Err(error) => return Err(error),
        };

        for node in self.permissions.nodes_for(path) {
            match session.fetch_node_state(node).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(path, node, "permission node not held");
                    return Ok(None);
                }
                Err(error) if error.needs_reauth() => return Ok(None),
                Err(error) => return Err(error),
            }
        }

        Ok(Some(Authentication { session, details }))
    }
}
