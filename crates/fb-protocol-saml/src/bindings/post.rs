//! HTTP-POST binding.
//!
//! Messages travel base64-encoded in HTML form fields; responses are carried
//! by an auto-submitting form posted from the user agent.

use base64::Engine;

use crate::error::{SamlError, SamlResult};
use crate::xml::xml_escape;

use super::{DecodedMessage, SamlMessageType};

/// HTTP-POST binding encoder/decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Decodes a SAML request from its HTTP-POST form field value.
    pub fn decode_request(
        saml_request: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(saml_request)
            .map_err(|e| SamlError::Base64Decode(e.to_string()))?;

        let xml = String::from_utf8(decoded)
            .map_err(|e| SamlError::InvalidRequest(format!("Invalid UTF-8 in message: {e}")))?;

        Ok(DecodedMessage {
            xml,
            message_type: SamlMessageType::Request,
            relay_state: relay_state.map(String::from),
        })
    }

    /// Encodes a SAML request for HTTP-POST binding as a base64 form value.
    #[must_use]
    pub fn encode_request(xml: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(xml)
    }

    /// Renders the auto-submitting HTML form delivering a SAML response.
    ///
    /// `saml_response_b64` must already be base64-encoded. The page submits
    /// itself on load; a noscript fallback keeps the flow usable without
    /// JavaScript.
    #[must_use]
    pub fn response_form(
        saml_response_b64: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> String {
        let relay_state_input = relay_state
            .map(|rs| {
                format!(
                    r#"<input type="hidden" name="RelayState" value="{}"/>"#,
                    html_escape(rs)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Signing you in</title>
</head>
<body onload="document.forms[0].submit()">
    <h1>Redirecting you back to where you came from&hellip;</h1>
    <form method="post" action="{}" autocomplete="off">
        <input type="hidden" name="SAMLResponse" value="{}"/>
        {}
        <noscript>
            <input type="submit" value="Continue"/>
        </noscript>
    </form>
</body>
</html>"#,
            html_escape(destination),
            saml_response_b64,
            relay_state_input
        )
    }
}

/// Escapes HTML special characters for attribute and text interpolation.
fn html_escape(s: &str) -> String {
    // Same character set as XML attribute escaping plus the single quote.
    xml_escape(s).replace('\'', "&#x27;")
}
