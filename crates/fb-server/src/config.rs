//! Server configuration.
//!
//! Loaded once at startup from environment variables with sensible defaults;
//! the rest of the process treats it as injected constants.

use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Base URL for the server, used in generated entity IDs and locations.
    pub base_url: String,

    /// SAML entity ID presented in IdP metadata. Defaults to
    /// `{base_url}/saml/metadata`.
    pub saml_entity_id: String,

    /// Secret for the state cookie's authenticated encryption.
    pub cookie_secret: String,

    /// Secret for the signed-cookie layer. Distinct from the encryption
    /// secret; at least 32 bytes.
    pub cookie_signing_secret: String,

    /// Issuer URL of the upstream OIDC provider.
    pub oidc_issuer: String,

    /// OIDC client ID.
    pub oidc_client_id: String,

    /// OIDC client secret.
    pub oidc_client_secret: String,

    /// Callback URL the provider redirects back to.
    pub oidc_callback_url: String,

    /// Space-separated OIDC scopes.
    pub oidc_scopes: String,

    /// Timeout for OIDC discovery and token-endpoint requests, seconds.
    pub http_timeout_secs: u64,

    /// Path to the PEM-encoded SAML signing key.
    pub saml_signing_key_path: String,

    /// Path to the PEM-encoded SAML signing certificate.
    pub saml_signing_cert_path: String,

    /// Validity window for issued assertions, seconds.
    pub assertion_lifetime_secs: i64,

    /// Path to the service-provider registry JSON document.
    pub service_providers_path: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env if present.
        let _ = dotenvy::dotenv();

        let host = std::env::var("FB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("FB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let base_url =
            std::env::var("FB_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));
        let saml_entity_id = std::env::var("FB_SAML_ENTITY_ID")
            .unwrap_or_else(|_| format!("{base_url}/saml/metadata"));

        let cookie_secret = require("FB_COOKIE_SECRET")?;
        let cookie_signing_secret = require("FB_COOKIE_SIGNING_SECRET")?;
        if cookie_signing_secret.len() < 32 {
            anyhow::bail!("FB_COOKIE_SIGNING_SECRET must be at least 32 bytes");
        }

        let oidc_issuer = require("FB_OIDC_ISSUER")?;
        let oidc_client_id = require("FB_OIDC_CLIENT_ID")?;
        let oidc_client_secret = require("FB_OIDC_CLIENT_SECRET")?;
        let oidc_callback_url = std::env::var("FB_OIDC_CALLBACK_URL")
            .unwrap_or_else(|_| format!("{base_url}/oidc/callback"));
        let oidc_scopes =
            std::env::var("FB_OIDC_SCOPES").unwrap_or_else(|_| "openid profile".to_string());

        let http_timeout_secs = std::env::var("FB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let saml_signing_key_path = require("FB_SAML_SIGNING_KEY")?;
        let saml_signing_cert_path = require("FB_SAML_SIGNING_CERT")?;

        let assertion_lifetime_secs = std::env::var("FB_ASSERTION_LIFETIME_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300); // 5 minutes

        let service_providers_path = require("FB_SERVICE_PROVIDERS")?;

        Ok(Self {
            host,
            port,
            base_url,
            saml_entity_id,
            cookie_secret,
            cookie_signing_secret,
            oidc_issuer,
            oidc_client_id,
            oidc_client_secret,
            oidc_callback_url,
            oidc_scopes,
            http_timeout_secs,
            saml_signing_key_path,
            saml_signing_cert_path,
            assertion_lifetime_secs,
            service_providers_path,
        })
    }

    /// Creates a configuration for testing against a stub OIDC provider.
    #[must_use]
    pub fn for_testing(
        base_url: &str,
        oidc_issuer: &str,
        signing_key_path: &str,
        signing_cert_path: &str,
        service_providers_path: &str,
    ) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: base_url.to_string(),
            saml_entity_id: format!("{base_url}/saml/metadata"),
            cookie_secret: "test-cookie-encryption-secret".to_string(),
            cookie_signing_secret: "test-cookie-signing-secret-0123456789abcdef".to_string(),
            oidc_issuer: oidc_issuer.to_string(),
            oidc_client_id: "bridge-client".to_string(),
            oidc_client_secret: "bridge-secret".to_string(),
            oidc_callback_url: format!("{base_url}/oidc/callback"),
            oidc_scopes: "openid profile".to_string(),
            http_timeout_secs: 5,
            saml_signing_key_path: signing_key_path.to_string(),
            saml_signing_cert_path: signing_cert_path.to_string(),
            assertion_lifetime_secs: 300,
            service_providers_path: service_providers_path.to_string(),
        }
    }

    /// Returns the SAML SSO endpoint base URL.
    #[must_use]
    pub fn saml_sso_url(&self) -> String {
        format!("{}/saml/sso", self.base_url)
    }

    /// Returns the OIDC network timeout.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} environment variable is required"))
}
