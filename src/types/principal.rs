//! Principal
//!
//! Credential payload presented to the authorization server.

use serde_json::{json, Value};

/// Opaque JSON credential payload (e.g. username and password).
///
/// The payload is retained by principal-based sessions so they can fully
/// re-authorize when their token goes stale. Its contents never appear in
/// `Debug` output.
#[derive(Clone, PartialEq)]
pub struct Principal(Value);

impl Principal {
    /// Wrap an arbitrary JSON payload.
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Username/password principal.
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self(json!({
            "username": username.into(),
            "password": password.into(),
        }))
    }

    /// Get the JSON body sent to the server.
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Principal {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Principal([REDACTED])")
    }
}
