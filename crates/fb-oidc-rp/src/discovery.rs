//! OpenID Connect Discovery 1.0 support.
//!
//! Fetches the provider metadata document from the issuer's well-known
//! endpoint. Only the fields the bridge consumes are modeled.

use serde::{Deserialize, Serialize};

use crate::error::{OidcError, OidcResult};

/// OpenID Provider Metadata, as returned by
/// `/.well-known/openid-configuration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// URL of the authorization server's issuer identifier.
    pub issuer: String,

    /// URL of the authorization endpoint.
    pub authorization_endpoint: String,

    /// URL of the token endpoint.
    pub token_endpoint: String,

    /// URL of the JSON Web Key Set document.
    pub jwks_uri: String,

    /// URL of the UserInfo endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
}

/// Returns the well-known configuration URL for an issuer.
#[must_use]
pub fn well_known_url(issuer_url: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer_url.trim_end_matches('/')
    )
}

/// Fetches provider metadata from the issuer's well-known endpoint.
pub async fn fetch_provider_metadata(
    http: &reqwest::Client,
    issuer_url: &str,
) -> OidcResult<ProviderMetadata> {
    let url = well_known_url(issuer_url);

    let response = http.get(&url).send().await.map_err(|e| OidcError::Discovery {
        issuer: issuer_url.to_string(),
        message: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(OidcError::Discovery {
            issuer: issuer_url.to_string(),
            message: format!("well-known endpoint returned HTTP {}", response.status()),
        });
    }

    let metadata: ProviderMetadata = response.json().await.map_err(|e| OidcError::Discovery {
        issuer: issuer_url.to_string(),
        message: format!("invalid metadata document: {e}"),
    })?;

    tracing::info!(
        issuer = %metadata.issuer,
        authorization_endpoint = %metadata.authorization_endpoint,
        token_endpoint = %metadata.token_endpoint,
        "discovered OIDC provider endpoints"
    );

    Ok(metadata)
}
