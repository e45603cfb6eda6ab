//! Complete login-flow tests: SAML request in, OIDC round trip, SAML
//! response out.

use base64::Engine;

use fb_protocol_saml::{HttpPostBinding, HttpRedirectBinding};

use crate::common::{form_field, query_param, sample_authn_request, TestEnv};

/// Drives the whole bridge: redirect-bound AuthnRequest, OIDC redirect with
/// state and cookie, callback with code, auto-submit form with the signed
/// response.
#[tokio::test]
async fn full_login_flow_round_trip() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    // SP sends a redirect-bound AuthnRequest with a RelayState.
    let sso_url = HttpRedirectBinding::encode_request(
        &sample_authn_request("abc-123", Some("https://acme.example/acs")),
        &format!("{}/saml/sso?spId=acme", env.base_url),
        Some("xyz"),
    )?;
    let response = env.client.get(&sso_url).send().await?;

    // The bridge answers with a redirect to the OIDC provider and the
    // state cookie.
    assert_eq!(response.status().as_u16(), 307);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("redirect location")
        .to_string();
    assert!(
        location.starts_with(&format!("{}/authorize", env.issuer)),
        "unexpected redirect target: {location}"
    );

    let state = query_param(&location, "state").expect("state parameter");
    let nonce = query_param(&location, "nonce").expect("nonce parameter");
    assert!(query_param(&location, "client_id").is_some());

    let cookie = TestEnv::state_cookie(&response).expect("state cookie");

    // The provider redirects back with the code and the echoed state. The
    // stub reflects the code into the token nonce, so passing the flow
    // nonce as the code makes claim verification pass.
    let callback_url = format!(
        "{}/oidc/callback?code={}&state={}",
        env.base_url,
        urlencoded(&nonce),
        urlencoded(&state)
    );
    let response = env
        .client
        .get(&callback_url)
        .header(reqwest::header::COOKIE, cookie)
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);

    let csp = response
        .headers()
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .expect("CSP header")
        .to_string();
    assert!(csp.contains("form-action https://acme.example/acs;"));
    assert!(csp.contains("script-src 'unsafe-inline'"));

    let html = response.text().await?;
    assert!(html.contains(r#"action="https://acme.example/acs""#));
    assert_eq!(form_field(&html, "RelayState").as_deref(), Some("xyz"));

    // The decoded response is signed and correlates back to the request.
    let saml_response_b64 = form_field(&html, "SAMLResponse").expect("SAMLResponse field");
    let response_xml = String::from_utf8(
        base64::engine::general_purpose::STANDARD.decode(&saml_response_b64)?,
    )?;
    assert!(response_xml.contains(r#"InResponseTo="abc-123""#));
    assert!(response_xml.contains(r#"Destination="https://acme.example/acs""#));
    assert!(response_xml.contains("<saml:Audience>https://acme.example/saml/metadata</saml:Audience>"));
    assert!(response_xml.contains("<ds:Signature"));
    assert!(response_xml.contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    // The email name-id format configured for this SP, fed from the claims.
    assert!(response_xml.contains("u@acme.com"));
    assert!(response_xml.contains("<saml:AttributeValue>admins</saml:AttributeValue>"));

    Ok(())
}

/// The POST binding initiates the same flow.
#[tokio::test]
async fn post_binding_initiates_flow() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let encoded = HttpPostBinding::encode_request(&sample_authn_request("req-9", None));
    let response = env
        .client
        .post(format!("{}/saml/sso?spId=acme", env.base_url))
        .form(&[("SAMLRequest", encoded.as_str()), ("RelayState", "rs-9")])
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 307);
    assert!(TestEnv::state_cookie(&response).is_some());

    Ok(())
}

/// A callback without the state cookie is a client error.
#[tokio::test]
async fn callback_without_cookie_is_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .client
        .get(format!("{}/oidc/callback?code=c&state=s", env.base_url))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "session_missing");
    assert!(body["request_id"].is_string());

    Ok(())
}

/// A cookie that was not produced (and signed) by the bridge is discarded,
/// which leaves the flow session-less.
#[tokio::test]
async fn callback_with_forged_cookie_is_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env
        .client
        .get(format!("{}/oidc/callback?code=c&state=s", env.base_url))
        .header(reqwest::header::COOKIE, "saml_state=forged-value")
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);

    Ok(())
}

/// The state parameter from one flow cannot complete another flow's cookie.
#[tokio::test]
async fn callback_with_mismatched_state_is_bad_request() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    // Initiate two flows; take the cookie from the first and the state
    // from the second.
    let sso_url = HttpRedirectBinding::encode_request(
        &sample_authn_request("flow-1", None),
        &format!("{}/saml/sso?spId=acme", env.base_url),
        None,
    )?;
    let first = env.client.get(&sso_url).send().await?;
    let cookie = TestEnv::state_cookie(&first).expect("state cookie");
    let first_location = first
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let nonce = query_param(&first_location, "nonce").unwrap();

    let sso_url = HttpRedirectBinding::encode_request(
        &sample_authn_request("flow-2", None),
        &format!("{}/saml/sso?spId=acme", env.base_url),
        None,
    )?;
    let second = env.client.get(&sso_url).send().await?;
    let second_location = second
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let foreign_state = query_param(&second_location, "state").unwrap();

    let response = env
        .client
        .get(format!(
            "{}/oidc/callback?code={}&state={}",
            env.base_url,
            urlencoded(&nonce),
            urlencoded(&foreign_state)
        ))
        .header(reqwest::header::COOKIE, cookie)
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"], "malformed_state");

    Ok(())
}

fn urlencoded(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
