//! Proxy-integration wire types for the Introspector

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Error;
use crate::authorizer::AuthorizerContext;

/// Inbound proxy-integration event (only the fields the Introspector reads)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEvent {
    /// Request context populated by the gateway
    #[serde(default)]
    pub request_context: RequestContext,
    /// Request headers as forwarded by the gateway
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

/// Gateway request context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Context produced by the Authorizer
    #[serde(default)]
    pub authorizer: Option<AuthorizerContext>,
}

impl IntrospectionEvent {
    /// Build an event the way the gateway would after an Allow decision
    #[must_use]
    pub fn new(issuer: Option<&str>, authorization: Option<&str>) -> Self {
        Self {
            request_context: RequestContext {
                authorizer: Some(AuthorizerContext {
                    issuer: issuer.map(str::to_string),
                }),
            },
            headers: authorization
                .map(|value| HashMap::from([("Authorization".to_string(), value.to_string())])),
        }
    }

    /// Issuer placed in the context by the Authorizer
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.request_context
            .authorizer
            .as_ref()
            .and_then(|ctx| ctx.issuer.as_deref())
            .filter(|iss| !iss.is_empty())
    }

    /// `Authorization` header value, looked up case-insensitively
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// Proxy-integration response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// HTTP status
    pub status_code: u16,
    /// Response headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Serialized JSON body
    pub body: String,
}

impl HttpResponse {
    /// JSON response with a pretty-printed body
    #[must_use]
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()),
        }
    }

    /// `200 {"token": <introspection payload>}`
    #[must_use]
    pub fn introspected(payload: Value) -> Self {
        Self::json(200, &json!({ "token": payload }))
    }

    /// Error envelope `{"error": {"code", "message"}}` with the error's status
    #[must_use]
    pub fn error(err: &Error) -> Self {
        Self::json(
            err.status_code(),
            &json!({
                "error": {
                    "code": err.code(),
                    "message": err.public_message(),
                }
            }),
        )
    }

    /// Parse the body back into JSON
    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}
