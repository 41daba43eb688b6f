//! Error types for the token gate

use thiserror::Error;

/// Result type alias for the token gate
pub type Result<T> = std::result::Result<T, Error>;

/// Token gate errors
///
/// The Authorizer collapses every variant into a Deny decision; the
/// Introspector renders them as an error envelope (see [`Error::status_code`]).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (startup only)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No bearer token was presented
    #[error("No bearer token presented")]
    MissingToken,

    /// The token is not a decodable JWT
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The token's `iss` is absent from the issuer trust list
    #[error("Untrusted issuer: {0}")]
    UntrustedIssuer(String),

    /// The token's `aud` is absent from the audience trust list
    #[error("Untrusted audience: {0}")]
    UntrustedAudience(String),

    /// OIDC discovery for the issuer failed
    #[error("Discovery failed: {0}")]
    DiscoveryFailure(String),

    /// The issuer's key set could not be fetched or parsed
    #[error("Key set unavailable: {0}")]
    KeySetFailure(String),

    /// Signature or standard claim validation failed
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),

    /// OIDC discovery for the introspection endpoint failed
    #[error("Introspection discovery failed: {0}")]
    IntrospectionDiscoveryFailure(String),

    /// The introspection endpoint call failed or returned non-2xx
    #[error("Introspection call failed: {0}")]
    IntrospectionCallFailure(String),

    /// A value the upstream authorizer should have propagated is missing
    #[error("Missing authorizer context: {0}")]
    MissingContext(&'static str),
}

impl Error {
    /// Stable machine-readable code for logs and error envelopes
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::UntrustedIssuer(_) => "UNTRUSTED_ISSUER",
            Self::UntrustedAudience(_) => "UNTRUSTED_AUDIENCE",
            Self::DiscoveryFailure(_) => "DISCOVERY_FAILURE",
            Self::KeySetFailure(_) => "KEY_SET_FAILURE",
            Self::SignatureInvalid(_) => "SIGNATURE_INVALID",
            Self::IntrospectionDiscoveryFailure(_) => "INTROSPECTION_DISCOVERY_FAILURE",
            Self::IntrospectionCallFailure(_) => "INTROSPECTION_CALL_FAILURE",
            Self::MissingContext(_) => "MISSING_CONTEXT",
        }
    }

    /// HTTP status the Introspector answers with for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingToken => 401,
            Self::IntrospectionDiscoveryFailure(_) | Self::IntrospectionCallFailure(_) => 502,
            _ => 500,
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Upstream failures only expose their category; the detail stays in logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::IntrospectionDiscoveryFailure(_) => {
                "Could not discover the issuer's introspection endpoint".to_string()
            }
            Self::IntrospectionCallFailure(_) => "Token introspection failed".to_string(),
            Self::DiscoveryFailure(_) | Self::KeySetFailure(_) => {
                "Issuer metadata unavailable".to_string()
            }
            Self::Config(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}
