//! Remote key set retrieval and JWT signature verification.
//!
//! # Verification flow
//!
//! 1. Fetch the issuer's JWKS from the discovered `jwks_uri` (once per call).
//! 2. Decode the JWT header and refuse symmetric or unknown algorithms.
//! 3. Try every key whose `kid` matches the header (all keys if the token
//!    carries no `kid`) until one verifies the signature.
//! 4. Validate `exp` / `nbf` (when present) with the configured leeway, and
//!    require the verified `iss` to equal the trust-checked issuer.

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation,
    jwk::{Jwk, JwkSet},
};
use reqwest::Client;
use tracing::debug;

use crate::http::describe;
use crate::oidc::token::Claims;
use crate::{Error, Result};

/// Signature algorithms accepted from remote issuers.
///
/// HMAC variants are excluded: a public key set can never authenticate them.
pub const ACCEPTED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// Public signing keys published by one issuer, scoped to a single request.
#[derive(Debug, Clone)]
pub struct RemoteKeySet {
    jwks_uri: String,
    keys: JwkSet,
}

impl RemoteKeySet {
    /// Wrap an already-fetched key set
    #[must_use]
    pub fn new(jwks_uri: impl Into<String>, keys: JwkSet) -> Self {
        Self {
            jwks_uri: jwks_uri.into(),
            keys,
        }
    }

    /// Fetch the key set from `jwks_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeySetFailure`] on network failure, non-2xx status, or
    /// a body that is not a JWK set.
    pub async fn fetch(client: &Client, jwks_uri: &str) -> Result<Self> {
        debug!(jwks_uri = %jwks_uri, "Fetching JWKS");

        let response = client
            .get(jwks_uri)
            .send()
            .await
            .map_err(|e| Error::KeySetFailure(format!("{jwks_uri}: {}", describe(&e))))?;

        if !response.status().is_success() {
            return Err(Error::KeySetFailure(format!(
                "{jwks_uri}: HTTP {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| Error::KeySetFailure(format!("{jwks_uri}: invalid JWK set: {e}")))?;

        let key_set = Self::new(jwks_uri, keys);
        debug!(jwks_uri = %jwks_uri, keys = key_set.len(), "Fetched JWKS");
        Ok(key_set)
    }

    /// Number of keys in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.keys.len()
    }

    /// Whether the set holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.keys.is_empty()
    }

    /// Verify `token`'s signature and time claims against this key set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureInvalid`] if no key verifies the token, the
    /// algorithm is not accepted, the token is expired or not yet valid, or
    /// the verified issuer differs from `issuer`.
    pub fn verify(&self, token: &str, issuer: &str, leeway_secs: u64) -> Result<Claims> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| Error::SignatureInvalid(format!("invalid header: {e}")))?;

        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            return Err(Error::SignatureInvalid(format!(
                "algorithm {:?} is not accepted",
                header.alg
            )));
        }

        if self.is_empty() {
            return Err(Error::SignatureInvalid(format!(
                "{} publishes no keys",
                self.jwks_uri
            )));
        }

        let validation = build_validation(header.alg, issuer, leeway_secs);
        let kid = header.kid.as_deref();

        let mut last_error = None;
        for jwk in self.candidates(kid) {
            let key = match DecodingKey::from_jwk(jwk) {
                Ok(key) => key,
                Err(e) => {
                    debug!(kid = ?jwk.common.key_id, error = %e, "Skipping unusable JWK");
                    last_error = Some(e);
                    continue;
                }
            };

            match jsonwebtoken::decode::<Claims>(token, &key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => Error::SignatureInvalid(e.to_string()),
            None => Error::SignatureInvalid(format!(
                "no key in {} matches kid {}",
                self.jwks_uri,
                kid.unwrap_or("<none>")
            )),
        })
    }

    fn candidates<'a>(&'a self, kid: Option<&'a str>) -> impl Iterator<Item = &'a Jwk> {
        self.keys
            .keys
            .iter()
            .filter(move |jwk| kid.is_none_or(|kid| jwk.common.key_id.as_deref() == Some(kid)))
    }
}

/// Build a [`Validation`] pinned to one algorithm and the trust-checked issuer.
fn build_validation(alg: Algorithm, issuer: &str, leeway_secs: u64) -> Validation {
    let mut v = Validation::new(alg);
    v.leeway = leeway_secs;
    v.validate_exp = true;
    v.validate_nbf = true;
    // `exp` is checked when present but not mandatory.
    v.required_spec_claims.clear();
    // Audience is enforced by the trust list before verification.
    v.validate_aud = false;
    v.set_issuer(&[issuer]);
    v
}
