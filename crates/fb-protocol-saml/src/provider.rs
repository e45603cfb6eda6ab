//! The SAML identity-provider capability.
//!
//! [`SamlIdentityProvider`] is the contract the bridge orchestrator depends
//! on: parse an inbound login request, create a signed login response, and
//! produce IdP metadata. Entity IDs and SSO locations are scoped per service
//! provider by appending the `spId` query parameter, so each SP sees its own
//! IdP descriptor.

use chrono::{DateTime, Duration, Utc};

use crate::bindings::{HttpPostBinding, HttpRedirectBinding};
use crate::error::{SamlError, SamlResult};
use crate::registry::ServiceProviderConfig;
use crate::signature::XmlSigner;
use crate::types::{
    Assertion, AttributeStatement, AuthnContextClass, AuthnRequest, AuthnStatement, Conditions,
    NameId, NameIdFormat, NameIdPolicy, ResponseBuilder, SamlBinding, Subject, SubjectConfirmation,
    SubjectConfirmationData,
};
use crate::xml;

/// Name ID format URIs advertised in metadata when the SP does not pin one.
const DEFAULT_NAME_ID_FORMATS: &[&str] = &[
    "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified",
];

/// SAML identity provider for the bridge.
pub struct SamlIdentityProvider {
    /// Base entity ID; the per-SP id is appended as a query parameter.
    entity_id: String,
    /// Base SSO endpoint URL; the per-SP id is appended as a query parameter.
    sso_url: String,
    /// Signer for outgoing responses.
    signer: XmlSigner,
    /// Validity window applied to issued assertions.
    assertion_lifetime: Duration,
}

impl SamlIdentityProvider {
    /// Creates a new identity provider.
    #[must_use]
    pub fn new(
        entity_id: impl Into<String>,
        sso_url: impl Into<String>,
        signer: XmlSigner,
        assertion_lifetime: Duration,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            sso_url: sso_url.into(),
            signer,
            assertion_lifetime,
        }
    }

    /// Returns the entity ID presented to the given service provider.
    #[must_use]
    pub fn entity_id_for(&self, sp_id: &str) -> String {
        format!("{}?spId={}", self.entity_id, urlencoding::encode(sp_id))
    }

    /// Returns the SSO endpoint location presented to the given service provider.
    #[must_use]
    pub fn sso_location_for(&self, sp_id: &str) -> String {
        format!("{}?spId={}", self.sso_url, urlencoding::encode(sp_id))
    }

    /// Parses an inbound authentication request from its binding encoding.
    pub fn parse_login_request(
        &self,
        binding: SamlBinding,
        saml_request: &str,
    ) -> SamlResult<AuthnRequest> {
        let decoded = match binding {
            SamlBinding::HttpRedirect => HttpRedirectBinding::decode_request(saml_request, None)?,
            SamlBinding::HttpPost => HttpPostBinding::decode_request(saml_request, None)?,
        };
        parse_authn_request(&decoded.xml)
    }

    /// Creates a signed login response for a completed authentication.
    ///
    /// The response is bound to the original request (`InResponseTo`), the
    /// chosen ACS location (destination, recipient), and the SP entity ID
    /// (audience); its validity window is `now .. now + assertion_lifetime`.
    /// Returns the signed XML document.
    #[allow(clippy::too_many_arguments)]
    pub fn create_login_response(
        &self,
        sp_id: &str,
        sp: &ServiceProviderConfig,
        request_id: &str,
        acs_location: &str,
        name_id: NameId,
        attributes: AttributeStatement,
        now: DateTime<Utc>,
    ) -> SamlResult<String> {
        let issuer = self.entity_id_for(sp_id);
        let not_on_or_after = now + self.assertion_lifetime;

        let mut assertion = Assertion::new(&issuer)
            .with_subject(
                Subject::new(name_id).with_confirmation(
                    SubjectConfirmation::bearer().with_data(SubjectConfirmationData::for_request(
                        request_id,
                        acs_location,
                        not_on_or_after,
                    )),
                ),
            )
            .with_conditions(
                Conditions::for_window(now, not_on_or_after).with_audience(&sp.entity_id),
            )
            .with_authn_statement(AuthnStatement::new(
                AuthnContextClass::PasswordProtectedTransport,
            ));
        assertion.issue_instant = now;
        if !attributes.attributes.is_empty() {
            assertion = assertion.with_attribute_statement(attributes);
        }

        let response = ResponseBuilder::new(&issuer)
            .in_response_to(request_id)
            .destination(acs_location)
            .issued_at(now)
            .assertion(assertion)
            .build();

        let response_id = response.id.clone();
        let unsigned_xml = xml::render_response(&response);

        self.signer.sign(&unsigned_xml, &response_id)
    }

    /// Generates the IdP metadata document for the given service provider.
    #[must_use]
    pub fn metadata(&self, sp_id: &str) -> String {
        let certificate_b64 = self.signer.certificate_der().map(|der| {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.encode(der)
        });

        xml::render_idp_metadata(
            &self.entity_id_for(sp_id),
            certificate_b64.as_deref(),
            DEFAULT_NAME_ID_FORMATS,
            &self.sso_location_for(sp_id),
        )
    }

    /// Chooses the name ID to issue for a subject.
    ///
    /// The SP's configured format wins; without one, a fresh transient
    /// identifier is issued per login.
    #[must_use]
    pub fn select_name_id(
        &self,
        sp: &ServiceProviderConfig,
        subject_id: &str,
        email: Option<&str>,
    ) -> NameId {
        match sp.name_id_format.as_deref().and_then(NameIdFormat::from_uri) {
            Some(NameIdFormat::Email) => NameId::email(email.unwrap_or(subject_id)),
            Some(NameIdFormat::Persistent) => {
                NameId::persistent(subject_id).with_sp_name_qualifier(&sp.entity_id)
            }
            Some(NameIdFormat::Unspecified) => NameId::new(subject_id),
            _ => NameId::transient(),
        }
    }
}

/// Parses an AuthnRequest from its XML form.
///
/// The bridge extracts only the fields it bridges; anything else in the
/// request is ignored.
fn parse_authn_request(request_xml: &str) -> SamlResult<AuthnRequest> {
    let id = extract_attribute(request_xml, "AuthnRequest", "ID")
        .ok_or_else(|| SamlError::MissingElement("AuthnRequest ID".to_string()))?;

    let issuer = extract_element_content(request_xml, "Issuer")
        .ok_or_else(|| SamlError::MissingElement("Issuer".to_string()))?;

    let issue_instant = extract_attribute(request_xml, "AuthnRequest", "IssueInstant")
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let mut request = AuthnRequest::with_id(id, issuer);
    request.issue_instant = issue_instant;
    request.assertion_consumer_service_url =
        extract_attribute(request_xml, "AuthnRequest", "AssertionConsumerServiceURL");
    request.destination = extract_attribute(request_xml, "AuthnRequest", "Destination");
    request.protocol_binding = extract_attribute(request_xml, "AuthnRequest", "ProtocolBinding");
    request.force_authn = extract_attribute(request_xml, "AuthnRequest", "ForceAuthn")
        .map(|v| v == "true")
        .unwrap_or(false);
    request.is_passive = extract_attribute(request_xml, "AuthnRequest", "IsPassive")
        .map(|v| v == "true")
        .unwrap_or(false);

    if let Some(format) = extract_attribute(request_xml, "NameIDPolicy", "Format") {
        let allow_create = extract_attribute(request_xml, "NameIDPolicy", "AllowCreate")
            .map(|v| v == "true")
            .unwrap_or(false);
        request.name_id_policy = Some(NameIdPolicy {
            format: Some(format),
            allow_create,
        });
    }

    request
        .validate()
        .map_err(SamlError::InvalidRequest)?;

    Ok(request)
}

/// Extracts an attribute value from the named XML element.
fn extract_attribute(xml: &str, element: &str, attribute: &str) -> Option<String> {
    let patterns = [format!("<{}", element), format!("<samlp:{}", element)];

    for pattern in &patterns {
        if let Some(pos) = xml.find(pattern.as_str()) {
            let end = xml[pos..].find('>')?;
            let element_str = &xml[pos..pos + end];

            let attr_pattern = format!("{}=\"", attribute);
            if let Some(attr_start) = element_str.find(&attr_pattern) {
                let value_start = attr_start + attr_pattern.len();
                let value_end = element_str[value_start..].find('"')?;
                return Some(element_str[value_start..value_start + value_end].to_string());
            }
        }
    }
    None
}

/// Extracts text content of the named XML element.
fn extract_element_content(xml: &str, element: &str) -> Option<String> {
    let patterns = [
        (format!("<{}>", element), format!("</{}>", element)),
        (format!("<saml:{}>", element), format!("</saml:{}>", element)),
    ];

    for (open, close) in &patterns {
        if let Some(start) = xml.find(open.as_str()) {
            let content_start = start + open.len();
            if let Some(end) = xml[content_start..].find(close.as_str()) {
                return Some(xml[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}
