//! Configuration management

use std::{fmt, path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Variables read verbatim from the process environment.
const RAW_ENV_KEYS: &[&str] = &[
    "TRUSTED_ISSUERS",
    "TRUSTED_AUDIENCES",
    "CLIENT_ID",
    "CLIENT_SECRET",
    "OAUTH2_INTROSPECTION_CLIENT_ID",
    "OAUTH2_INTROSPECTION_CLIENT_SECRET",
];

/// Prefix for tuning knobs (`TOKEN_GATE_HTTP_TIMEOUT_SECS`, ...)
pub const ENV_PREFIX: &str = "TOKEN_GATE_";

/// Main configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Issuer allow-list (`TRUSTED_ISSUERS`)
    #[serde(deserialize_with = "deserialize_list")]
    pub trusted_issuers: Vec<String>,
    /// Audience allow-list (`TRUSTED_AUDIENCES`)
    #[serde(deserialize_with = "deserialize_list")]
    pub trusted_audiences: Vec<String>,
    /// Introspection client id (`CLIENT_ID`)
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub client_id: Option<String>,
    /// Introspection client secret (`CLIENT_SECRET`)
    #[serde(deserialize_with = "deserialize_opt_string", skip_serializing)]
    pub client_secret: Option<String>,
    /// Preferred over `client_id` when set
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub oauth2_introspection_client_id: Option<String>,
    /// Preferred over `client_secret` when set
    #[serde(deserialize_with = "deserialize_opt_string", skip_serializing)]
    pub oauth2_introspection_client_secret: Option<String>,
    /// Overall timeout for each outbound call, in seconds
    pub http_timeout_secs: u64,
    /// Connect timeout for each outbound call, in seconds
    pub http_connect_timeout_secs: u64,
    /// Refuse plain-HTTP issuer, key-set and introspection URLs
    pub https_only: bool,
    /// Leeway applied to `exp` / `nbf`
    pub clock_skew_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log format (text, json)
    pub log_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trusted_issuers: Vec::new(),
            trusted_audiences: Vec::new(),
            client_id: None,
            client_secret: None,
            oauth2_introspection_client_id: None,
            oauth2_introspection_client_secret: None,
            http_timeout_secs: 10,
            http_connect_timeout_secs: 5,
            https_only: true,
            clock_skew_secs: 0,
            log_level: "info".to_string(),
            log_format: None,
        }
    }
}

// Secrets must never reach logs through `{:?}`.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("trusted_issuers", &self.trusted_issuers)
            .field("trusted_audiences", &self.trusted_audiences)
            .field("client_id", &self.client_id)
            .field("oauth2_introspection_client_id", &self.oauth2_introspection_client_id)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_connect_timeout_secs", &self.http_connect_timeout_secs)
            .field("https_only", &self.https_only)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from an optional YAML file, then the environment.
    ///
    /// Environment values override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment
            .merge(Env::raw().only(RAW_ENV_KEYS))
            .merge(Env::prefixed(ENV_PREFIX));

        figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Outbound HTTP settings derived from this configuration
    #[must_use]
    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            connect_timeout: Duration::from_secs(self.http_connect_timeout_secs),
            https_only: self.https_only,
        }
    }

    /// Introspection client credentials, preferring the `OAUTH2_INTROSPECTION_*` names.
    pub fn client_credentials(&self) -> Result<ClientCredentials> {
        let pick = |preferred: &Option<String>, fallback: &Option<String>| {
            preferred
                .as_deref()
                .or(fallback.as_deref())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let client_id = pick(&self.oauth2_introspection_client_id, &self.client_id)
            .ok_or_else(|| Error::Config("CLIENT_ID is not set".to_string()))?;
        let client_secret = pick(&self.oauth2_introspection_client_secret, &self.client_secret)
            .ok_or_else(|| Error::Config("CLIENT_SECRET is not set".to_string()))?;

        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Total time allowed for one request
    pub timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Reject non-HTTPS URLs
    pub https_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Config::default().http()
    }
}

/// Client credential pair used to authenticate at the introspection endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Basic-auth username
    pub client_id: String,
    /// Basic-auth password
    pub client_secret: String,
}

impl ClientCredentials {
    /// `Authorization` header value: `Basic base64(id:secret)`
    #[must_use]
    pub fn basic_auth_header(&self) -> String {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", self.client_id, self.client_secret),
        );
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Environment values are parsed by figment, so `12345` arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Unsigned(n) => n.to_string(),
            Self::Signed(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize a list given either as a comma-separated string or a sequence.
///
/// Entries are trimmed and empty entries dropped.
fn deserialize_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        Vec(Vec<Scalar>),
        One(Scalar),
    }

    let items = match StringOrVec::deserialize(deserializer)? {
        StringOrVec::One(s) => s
            .into_string()
            .split(',')
            .map(str::to_string)
            .collect::<Vec<_>>(),
        StringOrVec::Vec(v) => v.into_iter().map(Scalar::into_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}
