//! ID-token claim decoding.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{OidcError, OidcResult};

/// Maximum accepted size of the encoded payload segment.
const MAX_ENCODED_PAYLOAD: usize = 128 * 1024;

/// Decoded ID-token claims.
///
/// Claim names vary by provider; the fields below accept both the standard
/// OIDC names and the Cognito-prefixed variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID at the provider).
    pub sub: String,

    /// Nonce echoed from the authorization request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Username.
    #[serde(
        default,
        alias = "preferred_username",
        alias = "cognito:username",
        skip_serializing_if = "Option::is_none"
    )]
    pub username: Option<String>,

    /// Group memberships.
    #[serde(default, alias = "cognito:groups", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any further claims, uninterpreted by the bridge.
    #[serde(flatten)]
    pub extras: HashMap<String, serde_json::Value>,
}

impl IdentityClaims {
    /// Returns the best available human identifier for the subject.
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Decodes the claims from an ID token without verifying its signature.
///
/// Only call this on tokens obtained directly from the provider's token
/// endpoint; the transport is the trust anchor here.
pub fn decode_id_token(id_token: &str) -> OidcResult<IdentityClaims> {
    let mut parts = id_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(OidcError::InvalidIdToken("not a compact JWT".to_string()));
    };

    if payload.len() > MAX_ENCODED_PAYLOAD {
        return Err(OidcError::InvalidIdToken(
            "payload exceeds maximum size".to_string(),
        ));
    }

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| OidcError::InvalidIdToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&decoded)
        .map_err(|e| OidcError::InvalidIdToken(format!("payload is not claim JSON: {e}")))
}
