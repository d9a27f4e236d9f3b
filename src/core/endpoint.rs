//! Endpoint
//!
//! Binds a transport to the authorization server base URL.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::TransportError;

/// Authorization server endpoint: base URL plus the transport used to reach it.
///
/// Strategies issue every call through [`Endpoint::perform`], which supplies
/// the bearer and content-type headers.
#[derive(Clone)]
pub struct Endpoint {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl Endpoint {
    /// Create new endpoint. A trailing slash on `base_url` is dropped.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one call against `path`, relative to the base URL.
    pub async fn perform(
        &self,
        method: HttpMethod,
        path: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        if let Some(credential) = bearer {
            headers.insert("authorization".to_string(), format!("Bearer {}", credential));
        }
        if body.is_some() {
            headers.insert("content-type".to_string(), "application/json".to_string());
        }

        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };

        let result = self.transport.send(request).await;
        match &result {
            Ok(_) => tracing::debug!(%method, path, "authorization server call succeeded"),
            Err(TransportError::BadStatus { status }) => {
                tracing::debug!(%method, path, status, "authorization server returned bad status")
            }
            Err(error) => tracing::debug!(%method, path, %error, "authorization server call failed"),
        }
        result
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
