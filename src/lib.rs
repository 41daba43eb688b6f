//! Token Gate Library
//!
//! OIDC token-exchange authorization gate for an API gateway.
//!
//! # Components
//!
//! - **Authorizer**: trust-checks a bearer token's issuer and audience, then
//!   verifies its signature against the issuer's discovered JWKS and answers
//!   with an Allow/Deny policy document.
//! - **Introspector**: exchanges the same bearer token at the issuer's
//!   introspection endpoint and returns the result verbatim.
//!
//! Both are invoked independently by the gateway and share nothing but the
//! `issuer` value the Authorizer places in the request context.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authorizer;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod introspector;
pub mod oidc;

pub use authorizer::Authorizer;
pub use error::{Error, Result};
pub use introspector::Introspector;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
///
/// `RUST_LOG` overrides `level`. `ansi` should be off wherever the log sink
/// does not render colour codes (serverless log streams).
pub fn setup_tracing(level: &str, format: Option<&str>, ansi: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        Some("json") => subscriber.with(fmt::layer().json().with_ansi(false)).try_init(),
        _ => subscriber.with(fmt::layer().with_ansi(ansi)).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Failed to setup tracing: {e}")))
}
