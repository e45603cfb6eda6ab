//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use chrono::Duration;

use fb_bridge::SsoOrchestrator;
use fb_oidc_rp::{OidcClientConfig, SharedOidcClient};
use fb_protocol_saml::signature::XmlSigner;
use fb_protocol_saml::{SamlIdentityProvider, ServiceProviderRegistry};

use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The SSO flow orchestrator.
    pub orchestrator: Arc<SsoOrchestrator>,
    /// Key for the signed-cookie layer.
    pub cookie_key: Key,
}

impl AppState {
    /// Builds the application state from configuration.
    ///
    /// Reads key material and the service-provider registry from disk; no
    /// network traffic happens here (OIDC discovery is deferred to first
    /// use).
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let key_pem = std::fs::read_to_string(&config.saml_signing_key_path).map_err(|e| {
            anyhow::anyhow!("reading {}: {e}", config.saml_signing_key_path)
        })?;
        let cert_pem = std::fs::read_to_string(&config.saml_signing_cert_path).map_err(|e| {
            anyhow::anyhow!("reading {}: {e}", config.saml_signing_cert_path)
        })?;
        let signer = XmlSigner::from_pem(&key_pem, Some(&cert_pem))
            .map_err(|e| anyhow::anyhow!("loading SAML signing material: {e}"))?;

        let registry_json =
            std::fs::read_to_string(&config.service_providers_path).map_err(|e| {
                anyhow::anyhow!("reading {}: {e}", config.service_providers_path)
            })?;
        let registry = ServiceProviderRegistry::from_json(&registry_json)
            .map_err(|e| anyhow::anyhow!("loading service providers: {e}"))?;
        if registry.is_empty() {
            tracing::warn!("service provider registry is empty; no SP can initiate a login");
        }

        let saml = SamlIdentityProvider::new(
            config.saml_entity_id.clone(),
            config.saml_sso_url(),
            signer,
            Duration::seconds(config.assertion_lifetime_secs),
        );

        let mut oidc_config = OidcClientConfig::new(
            &config.oidc_issuer,
            &config.oidc_client_id,
            &config.oidc_client_secret,
            &config.oidc_callback_url,
        );
        oidc_config.scopes = config.oidc_scopes.clone();
        oidc_config.timeout = config.http_timeout();
        let oidc = SharedOidcClient::new(oidc_config);

        let orchestrator =
            SsoOrchestrator::new(registry, saml, oidc, config.cookie_secret.clone());

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            cookie_key: Key::derive_from(config.cookie_signing_secret.as_bytes()),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}
