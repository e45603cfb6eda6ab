//! XML serialization for outgoing SAML documents.
//!
//! The bridge only ever emits documents it built itself, so rendering is
//! template-driven rather than DOM-driven. Inbound parsing lives next to the
//! identity-provider capability in [`crate::provider`].

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{Assertion, Response, StatusCode, SAMLP_NS, SAML_NS};

/// Escapes XML special characters for text and attribute interpolation.
pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Renders a SAML response to XML, assertions included, unsigned.
pub(crate) fn render_response(response: &Response) -> String {
    let mut attrs = format!(
        r#"ID="{}" Version="{}" IssueInstant="{}""#,
        xml_escape(&response.id),
        xml_escape(&response.version),
        instant(response.issue_instant),
    );
    if let Some(ref destination) = response.destination {
        attrs.push_str(&format!(r#" Destination="{}""#, xml_escape(destination)));
    }
    if let Some(ref in_response_to) = response.in_response_to {
        attrs.push_str(&format!(r#" InResponseTo="{}""#, xml_escape(in_response_to)));
    }

    let assertions: String = response.assertions.iter().map(render_assertion).collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<samlp:Response xmlns:samlp="{samlp}" xmlns:saml="{saml}" {attrs}><saml:Issuer>{issuer}</saml:Issuer><samlp:Status>{status}</samlp:Status>{assertions}</samlp:Response>"#,
        samlp = SAMLP_NS,
        saml = SAML_NS,
        attrs = attrs,
        issuer = xml_escape(&response.issuer),
        status = render_status(&response.status.status_code, response.status.status_message.as_deref()),
        assertions = assertions,
    )
}

fn render_status(code: &StatusCode, message: Option<&str>) -> String {
    let inner = code
        .status_code
        .as_ref()
        .map(|sub| {
            format!(
                r#"<samlp:StatusCode Value="{}"/>"#,
                xml_escape(&sub.value)
            )
        })
        .unwrap_or_default();
    let code_xml = if inner.is_empty() {
        format!(r#"<samlp:StatusCode Value="{}"/>"#, xml_escape(&code.value))
    } else {
        format!(
            r#"<samlp:StatusCode Value="{}">{}</samlp:StatusCode>"#,
            xml_escape(&code.value),
            inner
        )
    };
    match message {
        Some(msg) => format!(
            "{}<samlp:StatusMessage>{}</samlp:StatusMessage>",
            code_xml,
            xml_escape(msg)
        ),
        None => code_xml,
    }
}

fn render_assertion(assertion: &Assertion) -> String {
    let mut body = format!("<saml:Issuer>{}</saml:Issuer>", xml_escape(&assertion.issuer));

    if let Some(ref subject) = assertion.subject {
        let mut subject_xml = String::new();
        if let Some(ref name_id) = subject.name_id {
            let mut name_attrs = String::new();
            if let Some(ref format) = name_id.format {
                name_attrs.push_str(&format!(r#" Format="{}""#, xml_escape(format)));
            }
            if let Some(ref qualifier) = name_id.sp_name_qualifier {
                name_attrs.push_str(&format!(r#" SPNameQualifier="{}""#, xml_escape(qualifier)));
            }
            subject_xml.push_str(&format!(
                "<saml:NameID{}>{}</saml:NameID>",
                name_attrs,
                xml_escape(&name_id.value)
            ));
        }
        for confirmation in &subject.subject_confirmations {
            let data = confirmation
                .subject_confirmation_data
                .as_ref()
                .map(|d| {
                    let mut data_attrs = String::new();
                    if let Some(not_on_or_after) = d.not_on_or_after {
                        data_attrs
                            .push_str(&format!(r#" NotOnOrAfter="{}""#, instant(not_on_or_after)));
                    }
                    if let Some(ref recipient) = d.recipient {
                        data_attrs.push_str(&format!(r#" Recipient="{}""#, xml_escape(recipient)));
                    }
                    if let Some(ref in_response_to) = d.in_response_to {
                        data_attrs.push_str(&format!(
                            r#" InResponseTo="{}""#,
                            xml_escape(in_response_to)
                        ));
                    }
                    format!("<saml:SubjectConfirmationData{}/>", data_attrs)
                })
                .unwrap_or_default();
            subject_xml.push_str(&format!(
                r#"<saml:SubjectConfirmation Method="{}">{}</saml:SubjectConfirmation>"#,
                xml_escape(&confirmation.method),
                data
            ));
        }
        body.push_str(&format!("<saml:Subject>{}</saml:Subject>", subject_xml));
    }

    if let Some(ref conditions) = assertion.conditions {
        let mut cond_attrs = String::new();
        if let Some(not_before) = conditions.not_before {
            cond_attrs.push_str(&format!(r#" NotBefore="{}""#, instant(not_before)));
        }
        if let Some(not_on_or_after) = conditions.not_on_or_after {
            cond_attrs.push_str(&format!(r#" NotOnOrAfter="{}""#, instant(not_on_or_after)));
        }
        let restrictions: String = conditions
            .audience_restrictions
            .iter()
            .map(|ar| {
                let audiences: String = ar
                    .audiences
                    .iter()
                    .map(|a| format!("<saml:Audience>{}</saml:Audience>", xml_escape(a)))
                    .collect();
                format!(
                    "<saml:AudienceRestriction>{}</saml:AudienceRestriction>",
                    audiences
                )
            })
            .collect();
        body.push_str(&format!(
            "<saml:Conditions{}>{}</saml:Conditions>",
            cond_attrs, restrictions
        ));
    }

    if let Some(ref statement) = assertion.authn_statement {
        let session_index = statement
            .session_index
            .as_ref()
            .map(|s| format!(r#" SessionIndex="{}""#, xml_escape(s)))
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<saml:AuthnStatement AuthnInstant="{}"{}><saml:AuthnContext><saml:AuthnContextClassRef>{}</saml:AuthnContextClassRef></saml:AuthnContext></saml:AuthnStatement>"#,
            instant(statement.authn_instant),
            session_index,
            xml_escape(&statement.authn_context_class_ref)
        ));
    }

    if let Some(ref statement) = assertion.attribute_statement {
        let attributes: String = statement
            .attributes
            .iter()
            .map(|attr| {
                let friendly = attr
                    .friendly_name
                    .as_ref()
                    .map(|f| format!(r#" FriendlyName="{}""#, xml_escape(f)))
                    .unwrap_or_default();
                let values: String = attr
                    .values
                    .iter()
                    .map(|v| format!("<saml:AttributeValue>{}</saml:AttributeValue>", xml_escape(v)))
                    .collect();
                format!(
                    r#"<saml:Attribute Name="{}"{}>{}</saml:Attribute>"#,
                    xml_escape(&attr.name),
                    friendly,
                    values
                )
            })
            .collect();
        body.push_str(&format!(
            "<saml:AttributeStatement>{}</saml:AttributeStatement>",
            attributes
        ));
    }

    format!(
        r#"<saml:Assertion ID="{}" Version="{}" IssueInstant="{}">{}</saml:Assertion>"#,
        xml_escape(&assertion.id),
        xml_escape(&assertion.version),
        instant(assertion.issue_instant),
        body
    )
}

/// Renders the IdP metadata entity descriptor for one service provider.
pub(crate) fn render_idp_metadata(
    entity_id: &str,
    certificate_b64: Option<&str>,
    name_id_formats: &[&str],
    sso_location: &str,
) -> String {
    let key_descriptor = certificate_b64
        .map(|cert| {
            format!(
                r#"
        <md:KeyDescriptor use="signing">
            <ds:KeyInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
                <ds:X509Data>
                    <ds:X509Certificate>{}</ds:X509Certificate>
                </ds:X509Data>
            </ds:KeyInfo>
        </md:KeyDescriptor>"#,
                cert
            )
        })
        .unwrap_or_default();

    let formats: String = name_id_formats
        .iter()
        .map(|f| format!("\n        <md:NameIDFormat>{}</md:NameIDFormat>", xml_escape(f)))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<md:EntityDescriptor xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" entityID="{entity_id}">
    <md:IDPSSODescriptor WantAuthnRequestsSigned="false" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">{key_descriptor}{formats}
        <md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" Location="{sso_location}"/>
        <md:SingleSignOnService Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" Location="{sso_location}"/>
    </md:IDPSSODescriptor>
</md:EntityDescriptor>"#,
        entity_id = xml_escape(entity_id),
        key_descriptor = key_descriptor,
        formats = formats,
        sso_location = xml_escape(sso_location),
    )
}
