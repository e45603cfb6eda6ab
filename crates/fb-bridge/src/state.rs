//! The bridged login state and its two-half codec.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use fb_protocol_saml::AuthnRequest;

use crate::error::{BridgeError, BridgeResult};

/// The response delivery endpoint chosen for a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsoService {
    /// The binding URI the response will use.
    pub binding: String,
    /// The assertion-consumer location the response will be posted to.
    pub location: String,
}

/// Everything a login flow needs to survive the OIDC round trip.
///
/// Produced exactly once when the SAML request arrives and consumed exactly
/// once at the OIDC callback. It has no storage and no identity of its own;
/// its only representation in the world is the two encoded halves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SsoState {
    /// Which registered service provider this flow belongs to.
    pub service_provider_id: String,
    /// The parsed inbound authentication request.
    pub login_request: AuthnRequest,
    /// The delivery endpoint chosen at initiation time.
    pub sso_service: SsoService,
    /// The SAML request id, echoed back as `InResponseTo`.
    pub request_id: String,
    /// Opaque client-supplied value echoed back verbatim.
    pub relay_state: String,
}

/// Reversible, integrity-checked transformation between an [`SsoState`] and
/// two opaque strings.
///
/// The serialized state is compressed and then partitioned byte-by-byte:
/// even-indexed bytes form half A, odd-indexed bytes half B, each base64
/// encoded independently. Neither half alone decodes to anything; the
/// compressed stream only inflates once both are interleaved back together.
pub struct StateCodec;

impl StateCodec {
    /// Splits a state into its two encoded halves `(half_a, half_b)`.
    ///
    /// Half A holds the even-indexed bytes. For an odd-length payload it is
    /// one byte longer than half B; [`StateCodec::combine`] accepts exactly
    /// these two shapes.
    pub fn split(state: &SsoState) -> BridgeResult<(String, String)> {
        let serialized = serde_json::to_vec(state)
            .map_err(|e| BridgeError::Internal(format!("state serialization: {e}")))?;
        let compressed = deflate_compress(&serialized)?;

        let mut half_a = Vec::with_capacity(compressed.len().div_ceil(2));
        let mut half_b = Vec::with_capacity(compressed.len() / 2);
        for (i, byte) in compressed.iter().enumerate() {
            if i % 2 == 0 {
                half_a.push(*byte);
            } else {
                half_b.push(*byte);
            }
        }

        let engine = &base64::engine::general_purpose::STANDARD;
        Ok((engine.encode(half_a), engine.encode(half_b)))
    }

    /// Recombines two encoded halves into the original state.
    ///
    /// Reconstructed byte `i` comes from half A at `i / 2` when `i` is even
    /// and from half B at `i / 2` when odd, for a total of `|A| + |B|`
    /// bytes. That interleave is well-defined only when `|A| == |B|` or
    /// `|A| == |B| + 1` (the shapes `split` emits), so any other length
    /// relationship is rejected outright.
    ///
    /// Fails with [`BridgeError::MalformedState`] when base64 decoding,
    /// decompression, JSON parsing, or shape validation fails. The decoded
    /// value must positively deserialize as the exact [`SsoState`] shape;
    /// unknown or missing fields are errors.
    pub fn combine(half_a: &str, half_b: &str) -> BridgeResult<SsoState> {
        let engine = &base64::engine::general_purpose::STANDARD;
        let a = engine
            .decode(half_a)
            .map_err(|e| BridgeError::MalformedState(format!("half A base64: {e}")))?;
        let b = engine
            .decode(half_b)
            .map_err(|e| BridgeError::MalformedState(format!("half B base64: {e}")))?;

        if a.len() < b.len() || a.len() > b.len() + 1 {
            return Err(BridgeError::MalformedState(format!(
                "half lengths do not interleave ({} vs {})",
                a.len(),
                b.len()
            )));
        }

        let mut compressed = Vec::with_capacity(a.len() + b.len());
        for i in 0..a.len() + b.len() {
            let byte = if i % 2 == 0 { a[i / 2] } else { b[i / 2] };
            compressed.push(byte);
        }

        let serialized = deflate_decompress(&compressed)
            .map_err(|e| BridgeError::MalformedState(format!("decompression: {e}")))?;

        serde_json::from_slice(&serialized)
            .map_err(|e| BridgeError::MalformedState(format!("shape validation: {e}")))
    }
}

fn deflate_compress(data: &[u8]) -> BridgeResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| BridgeError::Internal(format!("compression: {e}")))?;
    encoder
        .finish()
        .map_err(|e| BridgeError::Internal(format!("compression finish: {e}")))
}

fn deflate_decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use fb_protocol_saml::SamlBinding;

    fn sample_state(relay_state: &str) -> SsoState {
        SsoState {
            service_provider_id: "acme".to_string(),
            login_request: AuthnRequest::with_id("abc-123", "https://acme.example/saml/metadata")
                .with_acs_url("https://acme.example/acs"),
            sso_service: SsoService {
                binding: SamlBinding::HttpPost.uri().to_string(),
                location: "https://acme.example/acs".to_string(),
            },
            request_id: "abc-123".to_string(),
            relay_state: relay_state.to_string(),
        }
    }

    #[test]
    fn split_combine_roundtrip() {
        let state = sample_state("xyz");
        let (half_a, half_b) = StateCodec::split(&state).unwrap();

        assert_ne!(half_a, half_b);
        let recovered = StateCodec::combine(&half_a, &half_b).unwrap();
        assert_eq!(recovered, state);
    }

    #[test]
    fn roundtrip_holds_for_both_payload_parities() {
        // Relay-state lengths shift the compressed size, covering both the
        // even case (|A| == |B|) and the odd case (|A| == |B| + 1).
        let mut saw_even = false;
        let mut saw_odd = false;
        for len in 0..32 {
            let state = sample_state(&"r".repeat(len));
            let (half_a, half_b) = StateCodec::split(&state).unwrap();

            let engine = &base64::engine::general_purpose::STANDARD;
            let a = engine.decode(&half_a).unwrap();
            let b = engine.decode(&half_b).unwrap();
            match a.len() - b.len() {
                0 => saw_even = true,
                1 => saw_odd = true,
                _ => panic!("split produced un-interleavable halves"),
            }

            assert_eq!(StateCodec::combine(&half_a, &half_b).unwrap(), state);
        }
        assert!(saw_even && saw_odd, "expected both parities across inputs");
    }

    #[test]
    fn neither_half_alone_is_meaningful() {
        let state = sample_state("xyz");
        let (half_a, half_b) = StateCodec::split(&state).unwrap();

        let engine = &base64::engine::general_purpose::STANDARD;
        for half in [&half_a, &half_b] {
            let bytes = engine.decode(half).unwrap();
            assert!(deflate_decompress(&bytes).is_err() || serde_json::from_slice::<SsoState>(&deflate_decompress(&bytes).unwrap()).is_err());
        }
    }

    #[test]
    fn combine_rejects_mismatched_half_lengths() {
        let engine = &base64::engine::general_purpose::STANDARD;
        // |A| two bytes shorter than |B| cannot interleave.
        let a = engine.encode([1u8]);
        let b = engine.encode([2u8, 3, 4]);
        assert!(matches!(
            StateCodec::combine(&a, &b),
            Err(BridgeError::MalformedState(_))
        ));
    }

    #[test]
    fn combine_rejects_garbage() {
        assert!(StateCodec::combine("!!!", "!!!").is_err());

        let engine = &base64::engine::general_purpose::STANDARD;
        let not_deflate = engine.encode([0u8, 1, 2, 3]);
        assert!(matches!(
            StateCodec::combine(&not_deflate, &not_deflate),
            Err(BridgeError::MalformedState(_))
        ));
    }

    #[test]
    fn combine_rejects_wrong_shape() {
        // A valid compressed JSON document that is not an SsoState.
        let serialized = serde_json::to_vec(&serde_json::json!({"hello": "world"})).unwrap();
        let compressed = deflate_compress(&serialized).unwrap();

        let mut half_a = Vec::new();
        let mut half_b = Vec::new();
        for (i, byte) in compressed.iter().enumerate() {
            if i % 2 == 0 {
                half_a.push(*byte);
            } else {
                half_b.push(*byte);
            }
        }

        let engine = &base64::engine::general_purpose::STANDARD;
        assert!(matches!(
            StateCodec::combine(&engine.encode(half_a), &engine.encode(half_b)),
            Err(BridgeError::MalformedState(_))
        ));
    }

    #[test]
    fn swapped_halves_do_not_reconstruct() {
        let state = sample_state("xyz");
        let (half_a, half_b) = StateCodec::split(&state).unwrap();

        // Swapping the halves scrambles the byte order; the result must
        // never silently decode to a state.
        match StateCodec::combine(&half_b, &half_a) {
            Ok(recovered) => assert_ne!(recovered, state),
            Err(BridgeError::MalformedState(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
