//! Gateway TOKEN-authorizer wire types

use serde::{Deserialize, Serialize};

/// IAM policy language version expected by the gateway
pub const POLICY_VERSION: &str = "2012-10-17";

/// The single action an authorizer policy grants or denies
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Principal reported for every decision
pub const PRINCIPAL_ID: &str = "userId";

/// Inbound authorizer event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerEvent {
    /// Raw value of the configured token source (usually `Authorization`)
    #[serde(default)]
    pub authorization_token: Option<String>,
    /// ARN of the method being invoked
    #[serde(default)]
    pub method_arn: String,
}

/// Policy effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Let the request through
    Allow,
    /// Reject the request
    Deny,
}

/// One policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// `execute-api:Invoke`
    pub action: String,
    /// Allow or Deny
    pub effect: Effect,
    /// The method ARN the decision applies to
    pub resource: String,
}

/// Policy document attached to every decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version
    pub version: String,
    /// Statements (always exactly one)
    pub statement: Vec<Statement>,
}

/// Values forwarded by the gateway to the downstream integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerContext {
    /// Issuer decoded from the token; absent when the token was undecodable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// The Authorizer's decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    /// Always [`PRINCIPAL_ID`]
    pub principal_id: String,
    /// Explicit Allow or Deny statement for the method ARN
    pub policy_document: PolicyDocument,
    /// Downstream context
    pub context: AuthorizerContext,
}

impl AuthorizerResponse {
    /// Build a decision with a single statement for `resource`
    #[must_use]
    pub fn new(effect: Effect, resource: &str, issuer: Option<String>) -> Self {
        Self {
            principal_id: PRINCIPAL_ID.to_string(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.to_string(),
                }],
            },
            context: AuthorizerContext { issuer },
        }
    }

    /// Allow `resource`, forwarding the verified issuer
    #[must_use]
    pub fn allow(resource: &str, issuer: String) -> Self {
        Self::new(Effect::Allow, resource, Some(issuer))
    }

    /// Deny `resource`, forwarding the issuer if one was decoded
    #[must_use]
    pub fn deny(resource: &str, issuer: Option<String>) -> Self {
        Self::new(Effect::Deny, resource, issuer)
    }

    /// Effect of the (single) statement
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.policy_document
            .statement
            .first()
            .map_or(Effect::Deny, |s| s.effect)
    }
}
