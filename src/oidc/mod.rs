//! OpenID Connect plumbing shared by the Authorizer and the Introspector
//!
//! - Provider metadata discovery (OpenID Connect Discovery 1.0)
//! - Unverified claim extraction for the trust check
//! - Remote JWKS retrieval and signature verification

pub mod discovery;
pub mod jwks;
pub mod token;

pub use discovery::DiscoveryDocument;
pub use jwks::RemoteKeySet;
pub use token::{Audience, Claims, bearer_token};
