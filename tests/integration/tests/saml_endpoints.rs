//! SAML endpoint tests: metadata and SSO input validation.

use fb_protocol_saml::HttpRedirectBinding;

use crate::common::{sample_authn_request, TestEnv};

/// The metadata endpoint returns the IdP descriptor as XML.
#[tokio::test]
async fn metadata_endpoint_returns_xml() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let url = format!("{}/saml/metadata?spId=acme", env.base_url);
    let response = env.client.get(&url).send().await?;

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("xml"), "got content type {content_type}");

    let body = response.text().await?;
    assert!(body.contains("EntityDescriptor"));
    assert!(body.contains("IDPSSODescriptor"));
    assert!(body.contains("SingleSignOnService"));
    assert!(body.contains("X509Certificate"));
    assert!(body.contains("spId=acme"));

    Ok(())
}

/// Repeated metadata requests return byte-identical documents.
#[tokio::test]
async fn metadata_endpoint_is_idempotent() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let url = format!("{}/saml/metadata?spId=acme", env.base_url);
    let first = env.client.get(&url).send().await?.text().await?;
    let second = env.client.get(&url).send().await?.text().await?;

    assert_eq!(first, second);

    Ok(())
}

/// Unknown service providers get a bad request, never an internal error.
#[tokio::test]
async fn unknown_service_provider_is_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .client
        .get(format!("{}/saml/metadata?spId=ghost", env.base_url))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "unknown_service_provider");

    let sso_url = HttpRedirectBinding::encode_request(
        &sample_authn_request("req-1", None),
        &format!("{}/saml/sso?spId=ghost", env.base_url),
        None,
    )?;
    let response = env.client.get(&sso_url).send().await?;
    assert_eq!(response.status().as_u16(), 400);

    Ok(())
}

/// A missing SAMLRequest parameter is reported with field-level detail.
#[tokio::test]
async fn sso_without_request_is_validation_error() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .client
        .get(format!("{}/saml/sso?spId=acme", env.base_url))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 422);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "validation");
    assert_eq!(body["field"], "SAMLRequest");

    Ok(())
}

/// A SAMLRequest that does not decode is a client error.
#[tokio::test]
async fn undecodable_request_is_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .client
        .get(format!(
            "{}/saml/sso?spId=acme&SAMLRequest=not-a-request",
            env.base_url
        ))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);

    Ok(())
}

/// Health endpoints answer without configuration side effects.
#[tokio::test]
async fn health_endpoints_respond() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    for path in ["/health", "/health/live", "/health/ready"] {
        let response = env
            .client
            .get(format!("{}{path}", env.base_url))
            .send()
            .await?;
        assert!(response.status().is_success(), "{path} failed");
    }

    Ok(())
}
