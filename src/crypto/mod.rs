//! AES-256-GCM sealing for outbound response bodies
//!
//! Every response leaves the process through this cipher. The wire format
//! is `base64(nonce):base64(ciphertext)` with a fresh 96-bit nonce per
//! response, so identical plaintexts produce distinct wire bytes.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;
use thiserror::Error;

/// Encryption key for AES-256-GCM
#[derive(Clone)]
pub struct EncryptionKey {
    key: [u8; 32],
}

/// Encryption error types
#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Invalid key: must be exactly 32 bytes (256 bits)")]
    InvalidKeyLength,

    #[error("Invalid base64 encoding: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Invalid ciphertext format")]
    InvalidCiphertextFormat,
}

impl EncryptionKey {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Create encryption key from a base64-encoded string
    pub fn from_base64(encoded: &str) -> Result<Self, EncryptionError> {
        let bytes = BASE64.decode(encoded)?;
        if bytes.len() != 32 {
            return Err(EncryptionError::InvalidKeyLength);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }
}

/// Opaque byte transform applied to every outbound body
pub struct BodyCipher {
    key: EncryptionKey,
}

impl BodyCipher {
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    pub fn from_base64(encoded: &str) -> Result<Self, EncryptionError> {
        Ok(Self::new(EncryptionKey::from_base64(encoded)?))
    }

    /// Seal a plaintext body. Called exactly once per response.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, EncryptionError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key.key)
            .map_err(|_| EncryptionError::EncryptionFailed)?;

        // Random 12-byte nonce as required by GCM
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| EncryptionError::EncryptionFailed)?;

        Ok(format!(
            "{}:{}",
            BASE64.encode(nonce_bytes),
            BASE64.encode(&ciphertext)
        ))
    }

    /// Recover the plaintext from a sealed body produced by [`Self::seal`]
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, EncryptionError> {
        let parts: Vec<&str> = sealed.split(':').collect();
        if parts.len() != 2 {
            return Err(EncryptionError::InvalidCiphertextFormat);
        }

        let nonce_bytes = BASE64.decode(parts[0])?;
        if nonce_bytes.len() != 12 {
            return Err(EncryptionError::InvalidCiphertextFormat);
        }

        let ciphertext = BASE64.decode(parts[1])?;

        let cipher = Aes256Gcm::new_from_slice(&self.key.key)
            .map_err(|_| EncryptionError::DecryptionFailed)?;

        let nonce = Nonce::from_slice(&nonce_bytes);

        cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| EncryptionError::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> BodyCipher {
        BodyCipher::new(EncryptionKey::new([0x42u8; 32]))
    }

    #[test]
    fn seal_open_roundtrip() {
        let cipher = test_cipher();
        let body = br#"{"ok":true}"#;

        let sealed = cipher.seal(body).unwrap();
        let opened = cipher.open(&sealed).unwrap();

        assert_eq!(opened, body);
    }

    #[test]
    fn sealing_twice_produces_distinct_wire_bytes() {
        let cipher = test_cipher();
        let body = b"same plaintext";

        let first = cipher.seal(body).unwrap();
        let second = cipher.seal(body).unwrap();

        // Fresh nonce per response
        assert_ne!(first, second);
        assert_eq!(cipher.open(&first).unwrap(), body);
        assert_eq!(cipher.open(&second).unwrap(), body);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = test_cipher().seal(b"secret").unwrap();
        let other = BodyCipher::new(EncryptionKey::new([0xffu8; 32]));

        let result = other.open(&sealed);
        assert!(matches!(result, Err(EncryptionError::DecryptionFailed)));
    }

    #[test]
    fn rejects_malformed_sealed_input() {
        let cipher = test_cipher();

        assert!(matches!(
            cipher.open("no-separator"),
            Err(EncryptionError::InvalidCiphertextFormat)
        ));
        assert!(matches!(
            cipher.open("a:b:c"),
            Err(EncryptionError::InvalidCiphertextFormat)
        ));
        assert!(matches!(
            cipher.open("!!!:valid"),
            Err(EncryptionError::Base64Error(_))
        ));
    }

    #[test]
    fn key_from_base64_enforces_length() {
        let short = BASE64.encode([0x42u8; 16]);
        assert!(matches!(
            EncryptionKey::from_base64(&short),
            Err(EncryptionError::InvalidKeyLength)
        ));

        let exact = BASE64.encode([0x42u8; 32]);
        assert!(EncryptionKey::from_base64(&exact).is_ok());
    }

    #[test]
    fn seals_empty_and_large_bodies() {
        let cipher = test_cipher();

        let empty = cipher.seal(b"").unwrap();
        assert_eq!(cipher.open(&empty).unwrap(), b"");

        let large = vec![0xabu8; 64 * 1024];
        let sealed = cipher.seal(&large).unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), large);
    }
}
