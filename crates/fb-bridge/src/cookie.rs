//! Authenticated encryption for the state cookie.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Nonce};
use base64::Engine;
use rand::RngCore;
use scrypt::{scrypt, Params};

use crate::error::{BridgeError, BridgeResult};

const SALT_LENGTH: usize = 64;
const IV_LENGTH: usize = 16;
const TAG_LENGTH: usize = 16;
const KEY_LENGTH: usize = 32;

// scrypt cost parameters: N = 2^14, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// AES-256-GCM with the 16-byte IV this cookie format uses.
type CookieCipher = AesGcm<Aes256, U16>;

/// Symmetric authenticated encryption of cookie values under a long-lived
/// shared secret.
///
/// Wire format: `base64(salt ‖ iv ‖ tag ‖ ciphertext)` with fixed component
/// sizes (64/16/16 bytes), so decryption slices by offset without framing.
/// The key is derived per value with scrypt over a fresh random salt, which
/// keeps brute force expensive even for weak secrets.
pub struct SecureCookieCodec;

impl SecureCookieCodec {
    /// Encrypts a plaintext under the secret.
    ///
    /// Every call draws a fresh salt and IV, so equal plaintexts produce
    /// unrelated ciphertexts.
    pub fn encrypt(secret: &str, plaintext: &str) -> BridgeResult<String> {
        let mut salt = [0u8; SALT_LENGTH];
        rand::rng().fill_bytes(&mut salt);
        let mut iv = [0u8; IV_LENGTH];
        rand::rng().fill_bytes(&mut iv);

        let key = derive_key(secret, &salt)?;
        let cipher = CookieCipher::new_from_slice(&key)
            .map_err(|e| BridgeError::Internal(format!("cipher init: {e}")))?;

        let ciphertext_and_tag = cipher
            .encrypt(Nonce::<U16>::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| BridgeError::Internal("encryption failed".to_string()))?;
        let (ciphertext, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LENGTH);

        let mut out = Vec::with_capacity(SALT_LENGTH + IV_LENGTH + TAG_LENGTH + ciphertext.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&iv);
        out.extend_from_slice(tag);
        out.extend_from_slice(ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(out))
    }

    /// Decrypts a value produced by [`SecureCookieCodec::encrypt`].
    ///
    /// Fails with [`BridgeError::DecryptionFailed`] for malformed encoding,
    /// truncated input, or tag mismatch. A wrong secret and a tampered
    /// ciphertext produce the same failure.
    pub fn decrypt(secret: &str, encoded: &str) -> BridgeResult<String> {
        let blob = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| BridgeError::DecryptionFailed)?;

        if blob.len() < SALT_LENGTH + IV_LENGTH + TAG_LENGTH {
            return Err(BridgeError::DecryptionFailed);
        }

        let salt = &blob[..SALT_LENGTH];
        let iv = &blob[SALT_LENGTH..SALT_LENGTH + IV_LENGTH];
        let tag = &blob[SALT_LENGTH + IV_LENGTH..SALT_LENGTH + IV_LENGTH + TAG_LENGTH];
        let ciphertext = &blob[SALT_LENGTH + IV_LENGTH + TAG_LENGTH..];

        let key = derive_key(secret, salt)?;
        let cipher = CookieCipher::new_from_slice(&key)
            .map_err(|e| BridgeError::Internal(format!("cipher init: {e}")))?;

        // The AEAD API expects the tag appended to the ciphertext.
        let mut ciphertext_and_tag = Vec::with_capacity(ciphertext.len() + TAG_LENGTH);
        ciphertext_and_tag.extend_from_slice(ciphertext);
        ciphertext_and_tag.extend_from_slice(tag);

        let plaintext = cipher
            .decrypt(Nonce::<U16>::from_slice(iv), ciphertext_and_tag.as_ref())
            .map_err(|_| BridgeError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| BridgeError::DecryptionFailed)
    }
}

/// Derives the cipher key from the secret and salt with scrypt.
fn derive_key(secret: &str, salt: &[u8]) -> BridgeResult<[u8; KEY_LENGTH]> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH)
        .map_err(|e| BridgeError::Internal(format!("scrypt params: {e}")))?;

    let mut key = [0u8; KEY_LENGTH];
    scrypt(secret.as_bytes(), salt, &params, &mut key)
        .map_err(|e| BridgeError::Internal(format!("scrypt: {e}")))?;

    Ok(key)
}
