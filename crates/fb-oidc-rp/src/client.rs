//! OIDC client: authorization URL construction and code exchange.

use std::time::Duration;

use serde::Deserialize;

use crate::claims::{decode_id_token, IdentityClaims};
use crate::discovery::{fetch_provider_metadata, ProviderMetadata};
use crate::error::{OidcError, OidcResult};

/// Configuration for the relying-party client.
#[derive(Debug, Clone)]
pub struct OidcClientConfig {
    /// Issuer URL of the upstream provider.
    pub issuer_url: String,
    /// Client ID registered at the provider.
    pub client_id: String,
    /// Client secret registered at the provider.
    pub client_secret: String,
    /// Redirect URL the provider sends the user agent back to.
    pub redirect_url: String,
    /// Space-separated scopes requested at authorization time.
    pub scopes: String,
    /// Timeout applied to discovery and token-endpoint requests.
    pub timeout: Duration,
}

impl OidcClientConfig {
    /// Creates a configuration with the default scope set and timeout.
    #[must_use]
    pub fn new(
        issuer_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            scopes: "openid profile".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Query parameters of the provider's callback redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// The authorization code.
    pub code: Option<String>,
    /// The echoed state parameter.
    pub state: Option<String>,
    /// Error code, when the provider denied the request.
    pub error: Option<String>,
    /// Human-readable error description.
    pub error_description: Option<String>,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

/// A discovered, ready-to-use OIDC client.
#[derive(Debug, Clone)]
pub struct OidcClient {
    config: OidcClientConfig,
    metadata: ProviderMetadata,
    http: reqwest::Client,
}

impl OidcClient {
    /// Performs provider discovery and returns a ready client.
    pub async fn discover(config: OidcClientConfig) -> OidcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OidcError::InvalidConfiguration(format!("HTTP client: {e}")))?;

        let metadata = fetch_provider_metadata(&http, &config.issuer_url).await?;

        Ok(Self {
            config,
            metadata,
            http,
        })
    }

    /// Returns the discovered provider metadata.
    #[must_use]
    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// Builds the authorization URL carrying the given state and nonce.
    pub fn authorization_url(&self, state: &str, nonce: &str) -> OidcResult<String> {
        let mut auth_url = url::Url::parse(&self.metadata.authorization_endpoint)
            .map_err(|e| OidcError::InvalidConfiguration(format!("authorization endpoint: {e}")))?;

        auth_url
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("scope", &self.config.scopes)
            .append_pair("state", state)
            .append_pair("nonce", nonce);

        Ok(auth_url.to_string())
    }

    /// Exchanges the authorization code for an identity.
    ///
    /// Verifies the echoed `state` before touching the network and the ID
    /// token's `nonce` claim after the exchange. Returns the decoded claims.
    pub async fn exchange_code(
        &self,
        params: &CallbackParams,
        expected_state: &str,
        nonce: &str,
    ) -> OidcResult<IdentityClaims> {
        if let Some(ref error) = params.error {
            let description = params.error_description.as_deref().unwrap_or("");
            return Err(OidcError::InvalidCallback(format!(
                "provider returned error '{error}': {description}"
            )));
        }

        if params.state.as_deref() != Some(expected_state) {
            return Err(OidcError::StateMismatch);
        }

        let code = params
            .code
            .as_deref()
            .ok_or_else(|| OidcError::InvalidCallback("missing code parameter".to_string()))?;

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_url),
        ];

        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| OidcError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                token_endpoint = %self.metadata.token_endpoint,
                status = %status,
                body = %truncate(&body, 500),
                "token exchange failed"
            );
            return Err(OidcError::TokenExchange(format!(
                "token endpoint returned HTTP {status}"
            )));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| OidcError::TokenExchange(format!("invalid token response: {e}")))?;

        let id_token = tokens.id_token.ok_or(OidcError::MissingIdToken)?;
        let claims = decode_id_token(&id_token)?;

        if claims.nonce.as_deref() != Some(nonce) {
            tracing::warn!("nonce mismatch in ID token");
            return Err(OidcError::NonceMismatch);
        }

        Ok(claims)
    }
}

/// Truncates a string to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
