//! SAML endpoints: metadata and single sign-on.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::Deserialize;

use fb_protocol_saml::SamlBinding;

use super::STATE_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters common to the SAML endpoints.
#[derive(Debug, Deserialize)]
pub struct SpQuery {
    /// The service-provider identifier.
    #[serde(rename = "spId")]
    pub sp_id: Option<String>,
}

/// Query parameters for the redirect-bound SSO endpoint.
#[derive(Debug, Deserialize)]
pub struct SsoRedirectParams {
    /// The service-provider identifier.
    #[serde(rename = "spId")]
    pub sp_id: Option<String>,

    /// The SAML request (deflated, base64, URL-encoded).
    #[serde(rename = "SAMLRequest")]
    pub saml_request: Option<String>,

    /// Relay state echoed back to the SP.
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// Form body for the POST-bound SSO endpoint.
#[derive(Debug, Deserialize)]
pub struct SsoPostForm {
    /// The SAML request (base64-encoded).
    #[serde(rename = "SAMLRequest")]
    pub saml_request: Option<String>,

    /// Relay state echoed back to the SP.
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// GET handler for the IdP metadata endpoint.
pub async fn metadata(
    State(state): State<AppState>,
    Query(query): Query<SpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sp_id = require_sp_id(query.sp_id.as_deref())?;

    // Resolve the SP first so an unknown id is a 400, not a metadata page.
    state
        .orchestrator
        .registry()
        .get(sp_id)
        .map_err(fb_bridge::BridgeError::from)?;

    let xml = state.orchestrator.saml().metadata(sp_id);
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

/// GET handler for the SSO endpoint (HTTP-Redirect binding).
pub async fn sso_redirect(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<SsoRedirectParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sp_id = require_sp_id(params.sp_id.as_deref())?;
    let saml_request = params
        .saml_request
        .as_deref()
        .ok_or_else(|| ApiError::validation("SAMLRequest", "parameter is required"))?;

    initiate(
        state,
        jar,
        sp_id,
        SamlBinding::HttpRedirect,
        saml_request,
        params.relay_state.as_deref(),
    )
    .await
}

/// POST handler for the SSO endpoint (HTTP-POST binding).
pub async fn sso_post(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<SpQuery>,
    Form(form): Form<SsoPostForm>,
) -> Result<impl IntoResponse, ApiError> {
    let sp_id = require_sp_id(query.sp_id.as_deref())?;
    let saml_request = form
        .saml_request
        .as_deref()
        .ok_or_else(|| ApiError::validation("SAMLRequest", "parameter is required"))?;

    initiate(
        state,
        jar,
        sp_id,
        SamlBinding::HttpPost,
        saml_request,
        form.relay_state.as_deref(),
    )
    .await
}

/// Shared initiate path: run transition 1, set the state cookie, redirect.
async fn initiate(
    state: AppState,
    jar: SignedCookieJar,
    sp_id: &str,
    binding: SamlBinding,
    saml_request: &str,
    relay_state: Option<&str>,
) -> Result<(SignedCookieJar, Redirect), ApiError> {
    let initiated = state
        .orchestrator
        .initiate(sp_id, binding, saml_request, relay_state.unwrap_or(""))
        .await?;

    // The callback arrives as a cross-site navigation from the OIDC
    // provider, so SameSite must be None for the cookie to accompany it.
    let cookie = Cookie::build((STATE_COOKIE, initiated.cookie_value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build();

    Ok((
        jar.add(cookie),
        Redirect::temporary(&initiated.authorization_url),
    ))
}

fn require_sp_id(sp_id: Option<&str>) -> Result<&str, ApiError> {
    sp_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation("spId", "parameter is required"))
}
