//! Common test utilities and fixtures.

use std::collections::HashMap;
use std::net::TcpListener;
use std::time::Duration;

use axum::extract::{Form, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use reqwest::Client;
use tokio::time::sleep;

use fb_server::{Server, ServerConfig};

/// Path to the test signing key, shared with the unit-test fixtures.
pub const SIGNING_KEY_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../testdata/idp-key.pem");

/// Path to the test signing certificate.
pub const SIGNING_CERT_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../testdata/idp-cert.pem");

/// Test environment running the bridge and a stub OIDC provider.
pub struct TestEnv {
    /// Base URL of the running bridge.
    pub base_url: String,
    /// Base URL (issuer) of the stub OIDC provider.
    pub issuer: String,
    /// HTTP client. Redirects are not followed so tests can inspect them.
    pub client: Client,
}

impl TestEnv {
    /// Starts the stub provider and the bridge with one registered SP.
    pub async fn new() -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("fb_server=debug,fb_bridge=debug")
            .try_init();

        let issuer = spawn_stub_provider().await?;

        // Write the SP registry for this environment.
        let registry_path = std::env::temp_dir().join(format!(
            "fedbridge-test-sps-{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &registry_path,
            serde_json::json!({
                "acme": {
                    "entity_id": "https://acme.example/saml/metadata",
                    "name": "Acme Corp",
                    "acs_endpoints": [
                        {
                            "location": "https://acme.example/acs",
                            "binding": "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
                            "is_default": true
                        }
                    ],
                    "name_id_format": "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress"
                }
            })
            .to_string(),
        )?;

        // Find an available port for the bridge.
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        let base_url = format!("http://127.0.0.1:{port}");

        let mut config = ServerConfig::for_testing(
            &base_url,
            &issuer,
            SIGNING_KEY_PATH,
            SIGNING_CERT_PATH,
            registry_path.to_str().expect("registry path"),
        );
        config.port = port;

        let server = Server::new(config)?;
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                tracing::error!("server error: {e}");
            }
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        wait_for_server(&client, &base_url).await?;

        Ok(Self {
            base_url,
            issuer,
            client,
        })
    }

    /// Extracts the bridge's state cookie pair (`name=value`) from a
    /// response's `Set-Cookie` headers.
    pub fn state_cookie(response: &reqwest::Response) -> Option<String> {
        response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("saml_state="))
            .and_then(|v| v.split(';').next())
            .map(String::from)
    }
}

/// Stub OIDC provider.
///
/// Serves the discovery document and a token endpoint that reflects the
/// received `code` back as the ID token's `nonce` claim; tests route the
/// flow nonce through the code parameter so claim verification passes.
async fn spawn_stub_provider() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let issuer = format!("http://{}", listener.local_addr()?);

    let app = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(|State(issuer): State<String>| async move {
                Json(serde_json::json!({
                    "issuer": issuer,
                    "authorization_endpoint": format!("{issuer}/authorize"),
                    "token_endpoint": format!("{issuer}/token"),
                    "jwks_uri": format!("{issuer}/jwks")
                }))
            }),
        )
        .route(
            "/token",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                let nonce = form.get("code").cloned().unwrap_or_default();
                let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
                let payload = serde_json::json!({
                    "sub": "user-1",
                    "cognito:username": "jdoe",
                    "cognito:groups": ["admins", "users"],
                    "name": "J. Doe",
                    "email": "u@acme.com",
                    "nonce": nonce
                });
                let id_token = format!(
                    "{}.{}.{}",
                    engine.encode(r#"{"alg":"RS256"}"#),
                    engine.encode(payload.to_string()),
                    engine.encode("sig")
                );
                Json(serde_json::json!({
                    "access_token": "at",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "id_token": id_token
                }))
            }),
        )
        .with_state(issuer.clone());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("stub provider error: {e}");
        }
    });

    Ok(issuer)
}

/// Polls the health endpoint until the server answers.
async fn wait_for_server(client: &Client, base_url: &str) -> anyhow::Result<()> {
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{base_url}/health")).send().await {
            if response.status().is_success() {
                return Ok(());
            }
        }
        sleep(Duration::from_millis(100)).await;
    }
    anyhow::bail!("server did not become ready at {base_url}")
}

/// A minimal AuthnRequest document from the test SP.
pub fn sample_authn_request(request_id: &str, acs_url: Option<&str>) -> String {
    let acs_attr = acs_url
        .map(|a| format!(r#" AssertionConsumerServiceURL="{a}""#))
        .unwrap_or_default();
    format!(
        r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="{request_id}" Version="2.0" IssueInstant="2024-03-01T10:00:00Z"{acs_attr}><saml:Issuer>https://acme.example/saml/metadata</saml:Issuer></samlp:AuthnRequest>"#
    )
}

/// Extracts a query parameter from a URL.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.to_string())
}

/// Extracts a hidden form field value from the auto-submit HTML page.
pub fn form_field(html: &str, name: &str) -> Option<String> {
    let marker = format!(r#"name="{name}" value=""#);
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}
