//! Strategy V1
//!
//! Reference wire protocol of the authorization server (`/v1` API).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::{Endpoint, HttpMethod};
use crate::error::{AuthResult, ProtocolError};
use crate::strategy::{absent_on_bad_status, AuthorizationStrategy, RefreshStrategy};
use crate::types::{Expiry, Principal, Token, UserDetails};

const AUTHENTICATE_PATH: &str = "/v1/auth/authenticate";
const REFRESH_PATH: &str = "/v1/auth/refresh";
const USER_DETAILS_PATH: &str = "/v1/user/details";
const CHECK_NODE_PATH: &str = "/v1/user/checknode";

/// Version 1 of the authorization server protocol.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyV1;

impl StrategyV1 {
    pub fn new() -> Self {
        Self
    }

    async fn user_details(
        &self,
        endpoint: &Endpoint,
        credential: &str,
        include_permissions: bool,
    ) -> AuthResult<Option<Value>> {
        let path = if include_permissions {
            format!("{}?includePermissions=true", USER_DETAILS_PATH)
        } else {
            USER_DETAILS_PATH.to_string()
        };
        absent_on_bad_status(
            endpoint
                .perform(HttpMethod::Get, &path, Some(credential), None)
                .await,
        )
    }
}

fn parse_token(response: &Value) -> Result<Token, ProtocolError> {
    let credential = response
        .get("token")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::MissingField {
            field: "token".to_string(),
        })?;

    let refresh_credential = match response.get("refreshToken") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            return Err(ProtocolError::InvalidField {
                field: "refreshToken".to_string(),
                message: "expected a string".to_string(),
            })
        }
    };

    let expires_at = response
        .get("expiresAt")
        .and_then(Value::as_i64)
        .ok_or_else(|| ProtocolError::MissingField {
            field: "expiresAt".to_string(),
        })?;
    let expires_at = Expiry::from_millis(expires_at).ok_or_else(|| ProtocolError::InvalidField {
        field: "expiresAt".to_string(),
        message: format!("{} is out of range", expires_at),
    })?;

    Ok(Token::new(credential, refresh_credential, expires_at))
}

fn parse_user_details(response: Value) -> Result<UserDetails, ProtocolError> {
    serde_json::from_value(response).map_err(|e| ProtocolError::InvalidJson {
        message: e.to_string(),
    })
}

fn parse_node_state(response: &Value) -> Result<bool, ProtocolError> {
    response
        .get("state")
        .and_then(Value::as_bool)
        .ok_or_else(|| ProtocolError::MissingField {
            field: "state".to_string(),
        })
}

#[async_trait]
impl AuthorizationStrategy for StrategyV1 {
    async fn authorize(
        &self,
        endpoint: &Endpoint,
        principal: Option<&Principal>,
    ) -> AuthResult<Option<Token>> {
        let body = principal.map(|p| p.as_json().clone());
        let response = absent_on_bad_status(
            endpoint
                .perform(HttpMethod::Post, AUTHENTICATE_PATH, None, body)
                .await,
        )?;
        Ok(response.as_ref().map(parse_token).transpose()?)
    }

    async fn fetch_user_details(
        &self,
        endpoint: &Endpoint,
        token: &Token,
    ) -> AuthResult<Option<UserDetails>> {
        let response = self.user_details(endpoint, token.credential(), true).await?;
        Ok(response.map(parse_user_details).transpose()?)
    }

    async fn fetch_node_state(
        &self,
        endpoint: &Endpoint,
        token: &Token,
        node: &str,
    ) -> AuthResult<Option<bool>> {
        let response = absent_on_bad_status(
            endpoint
                .perform(
                    HttpMethod::Post,
                    CHECK_NODE_PATH,
                    Some(token.credential()),
                    Some(json!({ "node": node })),
                )
                .await,
        )?;
        Ok(response.as_ref().map(parse_node_state).transpose()?)
    }

    async fn verify_token(&self, endpoint: &Endpoint, credential: &str) -> AuthResult<bool> {
        Ok(self.user_details(endpoint, credential, false).await?.is_some())
    }

    fn refresh_capability(&self) -> Option<&dyn RefreshStrategy> {
        Some(self)
    }
}

#[async_trait]
impl RefreshStrategy for StrategyV1 {
    async fn refresh(
        &self,
        endpoint: &Endpoint,
        refresh_credential: &str,
    ) -> AuthResult<Option<Token>> {
        let response = absent_on_bad_status(
            endpoint
                .perform(
                    HttpMethod::Post,
                    REFRESH_PATH,
                    None,
                    Some(json!({ "refreshToken": refresh_credential })),
                )
                .await,
        )?;
        Ok(response.as_ref().map(parse_token).transpose()?)
    }
}
