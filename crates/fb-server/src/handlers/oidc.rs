//! OIDC callback endpoint.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};

use fb_oidc_rp::CallbackParams;
use fb_protocol_saml::HttpPostBinding;

use super::STATE_COOKIE;
use crate::error::ApiError;
use crate::state::AppState;

/// GET handler for the OIDC callback.
///
/// Consumes the provider redirect and the state cookie, completes the flow,
/// and returns the auto-submitting form posting the SAML response to the
/// service provider. The state cookie is cleared on success; a flow is
/// consumed exactly once.
pub async fn callback(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, ApiError> {
    let cookie_value = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    let result = state
        .orchestrator
        .complete(cookie_value.as_deref(), &params)
        .await;

    let jar = jar.remove(Cookie::from(STATE_COOKIE));
    let completed = result?;

    let html = HttpPostBinding::response_form(
        &completed.saml_response,
        &completed.acs_location,
        Some(&completed.relay_state),
    );

    Ok((
        jar,
        [(
            header::CONTENT_SECURITY_POLICY,
            completed.content_security_policy,
        )],
        Html(html),
    ))
}
