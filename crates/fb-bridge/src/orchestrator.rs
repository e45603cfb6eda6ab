//! The SSO flow state machine.
//!
//! A flow has two transitions and no stored state:
//!
//! 1. **Initiate** - an inbound SAML request becomes an OIDC authorization
//!    redirect plus an encrypted state cookie.
//! 2. **Complete** - the OIDC callback recombines both state halves and
//!    becomes a signed SAML response posted back to the service provider.
//!
//! Anything that fails in between restarts from the top; there is nothing to
//! clean up because nothing was stored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use fb_oidc_rp::{CallbackParams, IdentityClaims, SharedOidcClient};
use fb_protocol_saml::{
    AcsEndpoint, Attribute, AttributeStatement, SamlBinding, SamlIdentityProvider,
    ServiceProviderRegistry,
};

use crate::cookie::SecureCookieCodec;
use crate::error::{BridgeError, BridgeResult};
use crate::state::{SsoService, SsoState, StateCodec};

/// Result of the Initiate transition.
///
/// The transport layer sets `cookie_value` as the signed state cookie and
/// redirects the user agent to `authorization_url`.
#[derive(Debug)]
pub struct InitiatedLogin {
    /// The OIDC authorization endpoint URL, state and nonce included.
    pub authorization_url: String,
    /// Encrypted cookie payload holding the second state half and the nonce.
    pub cookie_value: String,
}

/// Result of the Complete transition.
///
/// The transport layer renders these fields as the auto-submitting POST form
/// with `content_security_policy` as the response CSP header.
#[derive(Debug)]
pub struct CompletedLogin {
    /// Where the form posts: the ACS location chosen at initiation.
    pub acs_location: String,
    /// The signed SAML response, base64 encoded for the form field.
    pub saml_response: String,
    /// The relay state echoed back verbatim.
    pub relay_state: String,
    /// CSP scoping the inline submit script and the exact form action.
    pub content_security_policy: String,
}

/// The encrypted cookie's JSON payload.
#[derive(Debug, Serialize, Deserialize)]
struct StateCookie {
    /// The cookie-side half of the split state.
    state: String,
    /// Per-flow replay-protection nonce, verified against the ID token.
    nonce: String,
}

/// Orchestrates SAML↔OIDC login flows.
pub struct SsoOrchestrator {
    registry: ServiceProviderRegistry,
    saml: SamlIdentityProvider,
    oidc: SharedOidcClient,
    cookie_secret: String,
}

impl SsoOrchestrator {
    /// Creates a new orchestrator.
    #[must_use]
    pub fn new(
        registry: ServiceProviderRegistry,
        saml: SamlIdentityProvider,
        oidc: SharedOidcClient,
        cookie_secret: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            saml,
            oidc,
            cookie_secret: cookie_secret.into(),
        }
    }

    /// Returns the SAML identity provider capability.
    #[must_use]
    pub fn saml(&self) -> &SamlIdentityProvider {
        &self.saml
    }

    /// Returns the service-provider registry.
    #[must_use]
    pub fn registry(&self) -> &ServiceProviderRegistry {
        &self.registry
    }

    /// Transition 1: turns an inbound SAML request into an OIDC redirect.
    ///
    /// Resolves the service provider, parses the request, picks the response
    /// endpoint, splits the flow state into its two halves, and hands the
    /// transport a cookie plus a redirect. No server-side record is created.
    pub async fn initiate(
        &self,
        sp_id: &str,
        binding: SamlBinding,
        saml_request: &str,
        relay_state: &str,
    ) -> BridgeResult<InitiatedLogin> {
        let sp = self.registry.get(sp_id)?;

        let login_request = self.saml.parse_login_request(binding, saml_request)?;
        let request_id = login_request.id.clone();

        let endpoint = select_endpoint(
            &sp.acs_endpoints,
            login_request.assertion_consumer_service_url.as_deref(),
        );

        let state = SsoState {
            service_provider_id: sp_id.to_string(),
            login_request,
            sso_service: SsoService {
                binding: endpoint.binding.clone(),
                location: endpoint.location.clone(),
            },
            request_id: request_id.clone(),
            relay_state: relay_state.to_string(),
        };

        let (url_half, cookie_half) = StateCodec::split(&state)?;
        let nonce = uuid::Uuid::new_v4().to_string();

        let cookie_payload = serde_json::to_string(&StateCookie {
            state: cookie_half,
            nonce: nonce.clone(),
        })
        .map_err(|e| BridgeError::Internal(format!("cookie payload: {e}")))?;
        let cookie_value = SecureCookieCodec::encrypt(&self.cookie_secret, &cookie_payload)?;

        let client = self.oidc.get().await?;
        let authorization_url = client.authorization_url(&url_half, &nonce)?;

        tracing::info!(
            service_provider = sp_id,
            request_id = %request_id,
            acs_location = %endpoint.location,
            "initiated login, redirecting to OIDC provider"
        );

        Ok(InitiatedLogin {
            authorization_url,
            cookie_value,
        })
    }

    /// Transition 2: turns the OIDC callback into a signed SAML response.
    ///
    /// The state cookie must be present and decrypt cleanly; the code is
    /// exchanged upstream; both state halves recombine into the original
    /// flow state; the response is signed and wrapped for the POST binding.
    pub async fn complete(
        &self,
        cookie_value: Option<&str>,
        params: &CallbackParams,
    ) -> BridgeResult<CompletedLogin> {
        let encoded = cookie_value.ok_or(BridgeError::SessionMissing)?;

        let cookie_payload = SecureCookieCodec::decrypt(&self.cookie_secret, encoded)
            .map_err(|_| BridgeError::SessionMalformed)?;
        let cookie: StateCookie =
            serde_json::from_str(&cookie_payload).map_err(|_| BridgeError::SessionMalformed)?;

        let url_half = params
            .state
            .as_deref()
            .ok_or_else(|| BridgeError::MalformedState("missing state parameter".to_string()))?;

        let client = self.oidc.get().await?;
        let claims = client.exchange_code(params, url_half, &cookie.nonce).await?;

        let state = StateCodec::combine(url_half, &cookie.state)?;
        let sp = self.registry.get(&state.service_provider_id)?;

        let name_id =
            self.saml
                .select_name_id(sp, claims.display_id(), claims.email.as_deref());
        let attributes = claims_to_attributes(&claims);

        let now = Utc::now();
        let response_xml = self.saml.create_login_response(
            &state.service_provider_id,
            sp,
            &state.request_id,
            &state.sso_service.location,
            name_id,
            attributes,
            now,
        )?;

        use base64::Engine;
        let saml_response = base64::engine::general_purpose::STANDARD.encode(response_xml);

        tracing::info!(
            service_provider = %state.service_provider_id,
            request_id = %state.request_id,
            acs_location = %state.sso_service.location,
            "completed login, returning SAML response"
        );

        Ok(CompletedLogin {
            content_security_policy: format!(
                "script-src 'unsafe-inline'; form-action {};",
                state.sso_service.location
            ),
            acs_location: state.sso_service.location,
            saml_response,
            relay_state: state.relay_state,
        })
    }
}

/// Chooses the response endpoint for a flow.
///
/// Endpoints whose location equals the requested ACS URL are preferred; when
/// none match (or the request pinned nothing) the full registered set is the
/// candidate pool. The first candidate wins, so selection is deterministic
/// for a fixed configuration.
fn select_endpoint<'a>(endpoints: &'a [AcsEndpoint], requested: Option<&str>) -> &'a AcsEndpoint {
    if let Some(url) = requested {
        if let Some(matched) = endpoints.iter().find(|e| e.location == url) {
            return matched;
        }
    }
    &endpoints[0]
}

/// Maps decoded identity claims onto the SAML attribute statement.
fn claims_to_attributes(claims: &IdentityClaims) -> AttributeStatement {
    let mut statement = AttributeStatement::new()
        .with_attribute(Attribute::single("userId", claims.display_id()));

    if let Some(ref email) = claims.email {
        statement = statement.with_attribute(Attribute::single("email", email));
    }
    if let Some(ref name) = claims.name {
        statement = statement.with_attribute(Attribute::single("name", name));
    }
    if !claims.groups.is_empty() {
        statement = statement.with_attribute(Attribute::multi("groups", claims.groups.clone()));
    }

    statement
}
