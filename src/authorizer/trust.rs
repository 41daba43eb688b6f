//! Issuer and audience allow-lists

use std::fmt;

use crate::oidc::Audience;

/// Ordered, immutable allow-list.
///
/// Membership is exact string equality; entries are not normalised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustList(Vec<String>);

impl TrustList {
    /// Build from already-parsed entries
    #[must_use]
    pub fn new(entries: Vec<String>) -> Self {
        Self(entries)
    }

    /// Exact-match membership
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|entry| entry == value)
    }

    /// A string audience must be listed; an array audience needs one listed member.
    #[must_use]
    pub fn accepts_audience(&self, aud: &Audience) -> bool {
        aud.values().any(|value| self.contains(value))
    }

    /// Whether the list has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrustList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}
