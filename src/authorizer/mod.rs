//! Authorizer: issuer/audience trust check followed by JWKS signature verification.
//!
//! # Decision flow
//!
//! ```text
//! raw token
//!   -> strip "Bearer ", decode claims without verification  (MalformedToken)
//!   -> iss in issuer trust list?                             (UntrustedIssuer)
//!   -> aud in audience trust list?                           (UntrustedAudience)
//!   -> GET <iss>/.well-known/openid-configuration             (DiscoveryFailure)
//!   -> GET jwks_uri                                           (KeySetFailure)
//!   -> verify signature, exp, nbf, iss                        (SignatureInvalid)
//!   -> Allow
//! ```
//!
//! The trust check runs before any network call. Every failure is logged and
//! turned into a Deny decision; [`Authorizer::authorize`] cannot fail.

pub mod policy;
pub mod trust;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::oidc::{Claims, DiscoveryDocument, RemoteKeySet, bearer_token};
use crate::{Error, Result};

pub use policy::{AuthorizerContext, AuthorizerResponse, Effect, TokenAuthorizerEvent};
pub use trust::TrustList;

/// Gateway TOKEN authorizer
#[derive(Debug, Clone)]
pub struct Authorizer {
    issuers: TrustList,
    audiences: TrustList,
    http: Client,
    clock_skew_secs: u64,
}

impl Authorizer {
    /// Create from explicit trust lists and a shared HTTP client
    #[must_use]
    pub fn new(issuers: TrustList, audiences: TrustList, http: Client, clock_skew_secs: u64) -> Self {
        Self {
            issuers,
            audiences,
            http,
            clock_skew_secs,
        }
    }

    /// Create from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either trust list is empty.
    pub fn from_config(config: &Config, http: Client) -> Result<Self> {
        if config.trusted_issuers.is_empty() {
            return Err(Error::Config("TRUSTED_ISSUERS is not set".to_string()));
        }
        if config.trusted_audiences.is_empty() {
            return Err(Error::Config("TRUSTED_AUDIENCES is not set".to_string()));
        }

        let authorizer = Self::new(
            TrustList::new(config.trusted_issuers.clone()),
            TrustList::new(config.trusted_audiences.clone()),
            http,
            config.clock_skew_secs,
        );
        debug!(issuers = %authorizer.issuers, audiences = %authorizer.audiences, "Authorizer trust lists");
        Ok(authorizer)
    }

    /// Trusted issuers
    #[must_use]
    pub fn issuers(&self) -> &TrustList {
        &self.issuers
    }

    /// Trusted audiences
    #[must_use]
    pub fn audiences(&self) -> &TrustList {
        &self.audiences
    }

    /// Decide whether the request in `event` may proceed.
    pub async fn authorize(&self, event: &TokenAuthorizerEvent) -> AuthorizerResponse {
        let resource = event.method_arn.as_str();

        let (token, claims) = match decode(event.authorization_token.as_deref()) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(code = e.code(), error = %e, "Denying request: token not decodable");
                return AuthorizerResponse::deny(resource, None);
            }
        };

        debug!(
            issuer = claims.iss.as_deref().unwrap_or("-"),
            audience = %claims.aud.as_ref().map(ToString::to_string).unwrap_or_default(),
            "Decoded token claims"
        );

        match self.verify(token, &claims).await {
            Ok(issuer) => {
                info!(issuer = %issuer, resource = %resource, "Token verified, allowing request");
                AuthorizerResponse::allow(resource, issuer)
            }
            Err(e) => {
                warn!(
                    code = e.code(),
                    error = %e,
                    issuer = claims.iss.as_deref().unwrap_or("-"),
                    "Denying request"
                );
                AuthorizerResponse::deny(resource, claims.iss)
            }
        }
    }

    /// Trust check, then discovery and signature verification.
    ///
    /// Returns the verified issuer.
    async fn verify(&self, token: &str, claims: &Claims) -> Result<String> {
        let issuer = self.check_trust(claims)?;

        let document = DiscoveryDocument::discover(&self.http, issuer).await?;
        let key_set = RemoteKeySet::fetch(&self.http, document.require_jwks_uri()?).await?;
        key_set.verify(token, issuer, self.clock_skew_secs)?;

        Ok(issuer.to_string())
    }

    /// Check the unverified `iss` and `aud` against the trust lists.
    ///
    /// No network call happens before this passes.
    pub fn check_trust<'c>(&self, claims: &'c Claims) -> Result<&'c str> {
        let issuer = claims.iss.as_deref().unwrap_or_default();
        if !self.issuers.contains(issuer) {
            return Err(Error::UntrustedIssuer(issuer.to_string()));
        }

        match &claims.aud {
            Some(aud) if self.audiences.accepts_audience(aud) => Ok(issuer),
            Some(aud) => Err(Error::UntrustedAudience(aud.to_string())),
            None => Err(Error::UntrustedAudience("<none>".to_string())),
        }
    }
}

fn decode(raw: Option<&str>) -> Result<(&str, Claims)> {
    let token = raw.and_then(bearer_token).ok_or(Error::MissingToken)?;
    let claims = Claims::decode_unverified(token)?;
    Ok((token, claims))
}
