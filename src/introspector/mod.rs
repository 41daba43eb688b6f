//! Introspector: exchanges the caller's bearer token for the issuer's
//! introspection result.
//!
//! Runs behind the Authorizer, so the issuer it reads from the request
//! context has already been trust-checked and the token verified. Discovery
//! is repeated here because the two components share no state.

pub mod response;

use reqwest::{Client, header};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::{ClientCredentials, Config};
use crate::http::describe;
use crate::oidc::{DiscoveryDocument, bearer_token};
use crate::{Error, Result};

pub use response::{HttpResponse, IntrospectionEvent, RequestContext};

/// Media type requested from the introspection endpoint (RFC 9701)
pub const INTROSPECTION_ACCEPT: &str = "application/jwt";

/// Token-introspection handler
#[derive(Debug, Clone)]
pub struct Introspector {
    credentials: ClientCredentials,
    http: Client,
}

impl Introspector {
    /// Create with explicit client credentials
    #[must_use]
    pub fn new(credentials: ClientCredentials, http: Client) -> Self {
        Self { credentials, http }
    }

    /// Create from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the client id or secret is missing.
    pub fn from_config(config: &Config, http: Client) -> Result<Self> {
        let credentials = config.client_credentials()?;
        debug!(client_id = %credentials.client_id, "Introspection client configured");
        Ok(Self::new(credentials, http))
    }

    /// Handle one invocation. Every path yields a well-formed response.
    pub async fn introspect(&self, event: &IntrospectionEvent) -> HttpResponse {
        match self.exchange(event).await {
            Ok(payload) => {
                info!("Token introspection completed");
                HttpResponse::introspected(payload)
            }
            Err(e) => {
                error!(
                    code = e.code(),
                    status = e.status_code(),
                    error = %e,
                    "Token introspection failed"
                );
                HttpResponse::error(&e)
            }
        }
    }

    async fn exchange(&self, event: &IntrospectionEvent) -> Result<Value> {
        let issuer = event.issuer().ok_or(Error::MissingContext("issuer"))?;
        let token = event
            .authorization()
            .and_then(bearer_token)
            .ok_or(Error::MissingToken)?;
        debug!(issuer = %issuer, "Introspecting token");

        let endpoint = self.discover_endpoint(issuer).await?;
        self.call(&endpoint, token).await
    }

    /// Locate the issuer's introspection endpoint.
    pub async fn discover_endpoint(&self, issuer: &str) -> Result<String> {
        let document = DiscoveryDocument::discover(&self.http, issuer)
            .await
            .map_err(|e| Error::IntrospectionDiscoveryFailure(e.to_string()))?;
        let endpoint = document
            .require_introspection_endpoint()
            .map_err(|e| Error::IntrospectionDiscoveryFailure(e.to_string()))?;

        debug!(endpoint = %endpoint, "Token introspection endpoint");
        Ok(endpoint.to_string())
    }

    /// POST `token=<token>` to `endpoint` and return the body untouched.
    ///
    /// A JSON body is returned as JSON; anything else (a compact JWT for
    /// `application/jwt`) as a string.
    async fn call(&self, endpoint: &str, token: &str) -> Result<Value> {
        let response = self
            .http
            .post(endpoint)
            .header(header::ACCEPT, INTROSPECTION_ACCEPT)
            .header(header::AUTHORIZATION, self.credentials.basic_auth_header())
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| Error::IntrospectionCallFailure(format!("{endpoint}: {}", describe(&e))))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::IntrospectionCallFailure(format!("{endpoint}: {}", describe(&e))))?;

        if !status.is_success() {
            debug!(status = %status, body = %body, "Introspection endpoint rejected the request");
            return Err(Error::IntrospectionCallFailure(format!(
                "{endpoint}: HTTP {status}"
            )));
        }

        Ok(passthrough(body))
    }
}

fn passthrough(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}
