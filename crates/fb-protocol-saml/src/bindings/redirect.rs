//! HTTP-Redirect binding.
//!
//! Messages travel in URL query parameters, raw-DEFLATE compressed and
//! base64 encoded.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{SamlError, SamlResult};

use super::{DecodedMessage, SamlMessageType};

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes a SAML request for HTTP-Redirect binding.
    ///
    /// Returns a URL with the encoded message in query parameters.
    pub fn encode_request(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        let compressed = deflate_compress(xml.as_bytes())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&compressed);
        let url_encoded = urlencoding::encode(&encoded);

        let separator = if destination.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}{}={}",
            destination,
            separator,
            SamlMessageType::Request.form_param(),
            url_encoded
        );

        if let Some(rs) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(rs)));
        }

        Ok(url)
    }

    /// Decodes a SAML request from its HTTP-Redirect query parameter value.
    ///
    /// The value may still be URL-encoded or already decoded by the web
    /// framework; both are accepted.
    pub fn decode_request(
        saml_request: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let url_decoded = urlencoding::decode(saml_request)
            .map_err(|e| SamlError::InvalidRequest(format!("URL decode error: {e}")))?;

        let b64_decoded = base64::engine::general_purpose::STANDARD
            .decode(url_decoded.as_ref())
            .map_err(|e| SamlError::Base64Decode(e.to_string()))?;

        let xml_bytes = deflate_decompress(&b64_decoded)?;

        let xml = String::from_utf8(xml_bytes)
            .map_err(|e| SamlError::InvalidRequest(format!("Invalid UTF-8 in message: {e}")))?;

        Ok(DecodedMessage {
            xml,
            message_type: SamlMessageType::Request,
            relay_state: relay_state.map(String::from),
        })
    }
}

/// Compresses data using raw DEFLATE (no zlib header).
pub(crate) fn deflate_compress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SamlError::Deflate(format!("Compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SamlError::Deflate(format!("Compression finish error: {e}")))
}

/// Decompresses raw DEFLATE data.
pub(crate) fn deflate_decompress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SamlError::Deflate(format!("Decompression error: {e}")))?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_decode_request() {
        let xml = r#"<samlp:AuthnRequest ID="_1">content</samlp:AuthnRequest>"#;
        let url = HttpRedirectBinding::encode_request(xml, "https://idp.example.com/sso", Some("state123"))
            .unwrap();

        assert!(url.starts_with("https://idp.example.com/sso?"));
        assert!(url.contains("SAMLRequest="));
        assert!(url.contains("RelayState=state123"));

        let param = url
            .split("SAMLRequest=")
            .nth(1)
            .unwrap()
            .split('&')
            .next()
            .unwrap();
        let decoded = HttpRedirectBinding::decode_request(param, Some("state123")).unwrap();
        assert_eq!(decoded.xml, xml);
        assert_eq!(decoded.relay_state.as_deref(), Some("state123"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(HttpRedirectBinding::decode_request("%%%not-base64%%%", None).is_err());
        assert!(HttpRedirectBinding::decode_request("bm90LWRlZmxhdGU", None).is_err());
    }

    #[test]
    fn deflate_roundtrip() {
        let original = b"Test data for compression";
        let compressed = deflate_compress(original).unwrap();
        let decompressed = deflate_decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn url_with_existing_query() {
        let url =
            HttpRedirectBinding::encode_request("<Test/>", "https://idp.example.com/sso?spId=acme", None)
                .unwrap();
        assert!(url.contains("?spId=acme&SAMLRequest="));
    }
}
