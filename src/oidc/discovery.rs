//! OpenID Provider metadata discovery
//!
//! Fetched fresh on every call; nothing is cached between invocations.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::http::describe;
use crate::{Error, Result};

/// Path appended to the issuer URL (OpenID Connect Discovery 1.0 §4)
pub const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// The parts of an issuer's discovery document the gate relies on.
///
/// All other members are kept opaquely in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer identifier as published by the provider
    #[serde(default)]
    pub issuer: Option<String>,

    /// Key-set location
    #[serde(default)]
    pub jwks_uri: Option<String>,

    /// RFC 7662 token introspection endpoint
    #[serde(default)]
    pub introspection_endpoint: Option<String>,

    /// Everything else in the document
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DiscoveryDocument {
    /// Fetch `<issuer>/.well-known/openid-configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryFailure`] if the endpoint is unreachable,
    /// answers non-2xx, or returns something that is not a JSON object.
    pub async fn discover(client: &Client, issuer: &str) -> Result<Self> {
        let url = discovery_url(issuer);
        let parsed = Url::parse(&url)
            .map_err(|e| Error::DiscoveryFailure(format!("invalid issuer URL {issuer:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::DiscoveryFailure(format!(
                "unsupported issuer scheme: {}",
                parsed.scheme()
            )));
        }
        debug!(url = %url, "Discovering OpenID provider metadata");

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::DiscoveryFailure(format!("{url}: {}", describe(&e))))?;

        if !response.status().is_success() {
            return Err(Error::DiscoveryFailure(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let document: Self = response
            .json()
            .await
            .map_err(|e| Error::DiscoveryFailure(format!("{url}: invalid document: {e}")))?;

        debug!(
            issuer = document.issuer.as_deref().unwrap_or("-"),
            jwks_uri = document.jwks_uri.as_deref().unwrap_or("-"),
            introspection_endpoint = document.introspection_endpoint.as_deref().unwrap_or("-"),
            "Discovered OpenID provider"
        );
        Ok(document)
    }

    /// Key-set location, required for signature verification
    pub fn require_jwks_uri(&self) -> Result<&str> {
        self.jwks_uri
            .as_deref()
            .ok_or_else(|| Error::DiscoveryFailure("document has no jwks_uri".to_string()))
    }

    /// Introspection endpoint, required for the token exchange
    pub fn require_introspection_endpoint(&self) -> Result<&str> {
        self.introspection_endpoint.as_deref().ok_or_else(|| {
            Error::DiscoveryFailure("document has no introspection_endpoint".to_string())
        })
    }
}

/// Build the discovery URL for an issuer, tolerating a trailing slash.
#[must_use]
pub fn discovery_url(issuer: &str) -> String {
    format!("{}{WELL_KNOWN_PATH}", issuer.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_url_appends_well_known() {
        assert_eq!(
            discovery_url("https://idp.example.com"),
            "https://idp.example.com/.well-known/openid-configuration"
        );
    }

    #[test]
    fn discovery_url_handles_trailing_slash() {
        assert_eq!(
            discovery_url("https://idp.example.com/oauth/v2/"),
            "https://idp.example.com/oauth/v2/.well-known/openid-configuration"
        );
    }

    #[tokio::test]
    async fn rejects_issuer_that_is_not_an_http_url() {
        let client = Client::new();

        for issuer in ["not a url", "file:///etc", "ftp://idp.example.com"] {
            assert!(matches!(
                DiscoveryDocument::discover(&client, issuer).await,
                Err(Error::DiscoveryFailure(_))
            ));
        }
    }

    #[test]
    fn deserialize_keeps_unknown_members() {
        let json = r#"{
            "issuer": "https://idp.example.com",
            "jwks_uri": "https://idp.example.com/jwks",
            "introspection_endpoint": "https://idp.example.com/introspect",
            "token_endpoint": "https://idp.example.com/token",
            "scopes_supported": ["openid"]
        }"#;
        let doc: DiscoveryDocument = serde_json::from_str(json).unwrap();

        assert_eq!(doc.require_jwks_uri().unwrap(), "https://idp.example.com/jwks");
        assert_eq!(
            doc.require_introspection_endpoint().unwrap(),
            "https://idp.example.com/introspect"
        );
        assert_eq!(doc.extra["token_endpoint"], "https://idp.example.com/token");
    }

    #[test]
    fn missing_endpoints_are_discovery_failures() {
        let doc: DiscoveryDocument = serde_json::from_str(r#"{"issuer": "x"}"#).unwrap();

        assert!(matches!(doc.require_jwks_uri(), Err(Error::DiscoveryFailure(_))));
        assert!(matches!(
            doc.require_introspection_endpoint(),
            Err(Error::DiscoveryFailure(_))
        ));
    }
}
