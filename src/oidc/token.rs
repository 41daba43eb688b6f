//! Bearer token parsing and unverified claim extraction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// JWT claims the gate reads.
///
/// When produced by [`Claims::decode_unverified`] nothing here is
/// authenticated; only the trust check may look at it before the signature
/// has been confirmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience (single string or array)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry (NumericDate, may be fractional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
    /// Not-before (NumericDate, may be fractional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<f64>,
}

/// The `aud` claim, which RFC 7519 allows as a string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "api://default"`
    One(String),
    /// `"aud": ["api://default", "other"]`
    Many(Vec<String>),
}

impl Audience {
    /// All audience values
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(v) => v,
        };
        values.iter().map(String::as_str)
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One(s) => f.write_str(s),
            Self::Many(v) => f.write_str(&v.join(",")),
        }
    }
}

impl Claims {
    /// Decode a compact JWT without checking its signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedToken`] if the header or payload cannot be
    /// decoded.
    pub fn decode_unverified(token: &str) -> Result<Self> {
        jsonwebtoken::decode_header(token)
            .map_err(|e| Error::MalformedToken(format!("invalid header: {e}")))?;

        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(Error::MalformedToken(
                    "expected three dot-separated segments".to_string(),
                ));
            }
        };

        let bytes = base64::Engine::decode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            payload,
        )
        .map_err(|e| Error::MalformedToken(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::MalformedToken(format!("payload is not a claim set: {e}")))
    }
}

/// Strip an optional `Bearer ` scheme and surrounding whitespace.
///
/// Returns `None` for an empty credential.
#[must_use]
pub fn bearer_token(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => raw,
    };
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(json: &str) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, json)
    }

    fn unsigned_token(payload: &str) -> String {
        format!(
            "{}.{}.c2lnbmF0dXJl",
            b64(r#"{"alg":"ES256","typ":"JWT"}"#),
            b64(payload)
        )
    }

    #[test]
    fn decodes_issuer_and_string_audience() {
        let token = unsigned_token(r#"{"iss":"https://idp.example.com","aud":"api://default"}"#);

        let claims = Claims::decode_unverified(&token).unwrap();

        assert_eq!(claims.iss.as_deref(), Some("https://idp.example.com"));
        assert_eq!(claims.aud, Some(Audience::One("api://default".into())));
    }

    #[test]
    fn decodes_array_audience() {
        let token = unsigned_token(r#"{"iss":"x","aud":["a","b"]}"#);

        let claims = Claims::decode_unverified(&token).unwrap();
        let aud = claims.aud.unwrap();

        assert_eq!(aud.values().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(aud.to_string(), "a,b");
    }

    #[test]
    fn fractional_numeric_dates_decode() {
        let token = unsigned_token(r#"{"iss":"x","exp":1900000000.5,"nbf":1700000000.25}"#);

        let claims = Claims::decode_unverified(&token).unwrap();

        assert_eq!(claims.iss.as_deref(), Some("x"));
        assert_eq!(claims.exp, Some(1_900_000_000.5));
        assert_eq!(claims.nbf, Some(1_700_000_000.25));
    }

    #[test]
    fn missing_claims_decode_as_none() {
        let claims = Claims::decode_unverified(&unsigned_token("{}")).unwrap();
        assert_eq!(claims, Claims::default());
    }

    #[test]
    fn rejects_non_jwt_input() {
        for input in ["not-a-jwt", "", "a.b.c", "...", "Bearer"] {
            assert!(
                matches!(Claims::decode_unverified(input), Err(Error::MalformedToken(_))),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_payload_that_is_not_an_object() {
        let token = unsigned_token("[1,2,3]");
        assert!(matches!(
            Claims::decode_unverified(&token),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn rejects_extra_segments() {
        let token = format!("{}.extra", unsigned_token("{}"));
        assert!(Claims::decode_unverified(&token).is_err());
    }

    #[test]
    fn bearer_token_strips_scheme_case_insensitively() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_empty_credentials() {
        assert_eq!(bearer_token(""), None);
        assert_eq!(bearer_token("   "), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
