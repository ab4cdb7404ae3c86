//! API token encryption using AES-256-GCM
//!
//! Jira API tokens are stored in the database as AES-256-GCM ciphertexts with
//! additional authenticated data (AAD) binding the token to its project, so a
//! ciphertext copied onto another project row fails to decrypt.
//!
//! Wire format: version byte, 12-byte nonce, ciphertext + tag. Payloads
//! without the version marker are treated as legacy plaintext.

#![allow(deprecated)]

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

const VERSION_ENCRYPTED: u8 = 0x01;
const VERSION_FIELD_LEN: usize = 1;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const MIN_ENCRYPTED_LEN: usize = VERSION_FIELD_LEN + NONCE_LEN + TAG_LEN;

/// Crypto error types
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("invalid ciphertext format")]
    InvalidFormat,
    #[error("empty ciphertext")]
    EmptyCiphertext,
}

/// Secure wrapper for encryption keys with zeroization
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct CryptoKey(Vec<u8>);

impl CryptoKey {
    /// Create a new crypto key from bytes; must be exactly 32 bytes.
    pub fn new(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::EncryptionFailed(
                "Invalid key length: expected 32 bytes".to_string(),
            ));
        }
        Ok(CryptoKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt bytes using AES-256-GCM
pub fn encrypt_bytes(
    key: &CryptoKey,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(cipher_key);

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    // Prepend version byte and nonce
    let mut result = Vec::with_capacity(VERSION_FIELD_LEN + NONCE_LEN + ciphertext.len());
    result.push(VERSION_ENCRYPTED);
    result.extend_from_slice(&nonce);
    result.append(&mut ciphertext);

    Ok(result)
}

/// Decrypt bytes using AES-256-GCM
pub fn decrypt_bytes(
    key: &CryptoKey,
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() {
        return Err(CryptoError::EmptyCiphertext);
    }

    // Legacy plaintext payload (no version marker)
    if ciphertext[0] != VERSION_ENCRYPTED {
        return Ok(ciphertext.to_vec());
    }

    if ciphertext.len() < MIN_ENCRYPTED_LEN {
        return Err(CryptoError::InvalidFormat);
    }

    let nonce = Nonce::from_slice(&ciphertext[VERSION_FIELD_LEN..VERSION_FIELD_LEN + NONCE_LEN]);
    let tag_and_ct = &ciphertext[VERSION_FIELD_LEN + NONCE_LEN..];

    debug_assert!(tag_and_ct.len() >= TAG_LEN);

    let cipher_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(cipher_key);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: tag_and_ct,
                aad,
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Determine if a payload is using the encrypted format
pub fn is_encrypted_payload(ciphertext: &[u8]) -> bool {
    ciphertext.len() >= MIN_ENCRYPTED_LEN && ciphertext[0] == VERSION_ENCRYPTED
}

/// Encrypt a project's API token, binding it to the project id.
pub fn encrypt_api_token(
    key: &CryptoKey,
    project_id: uuid::Uuid,
    token: &str,
) -> Result<Vec<u8>, CryptoError> {
    let aad = project_id.to_string();
    encrypt_bytes(key, aad.as_bytes(), token.as_bytes())
}

/// Decrypt a project's API token.
pub fn decrypt_api_token(
    key: &CryptoKey,
    project_id: uuid::Uuid,
    ciphertext: &[u8],
) -> Result<String, CryptoError> {
    let aad = project_id.to_string();
    let bytes = decrypt_bytes(key, aad.as_bytes(), ciphertext)?;
    String::from_utf8(bytes)
        .map_err(|e| CryptoError::DecryptionFailed(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_key() -> CryptoKey {
        CryptoKey::new(vec![7u8; 32]).unwrap()
    }

    #[test]
    fn test_api_token_round_trip() {
        let key = test_key();
        let project_id = Uuid::new_v4();

        let ciphertext = encrypt_api_token(&key, project_id, "secret-token").unwrap();
        assert!(is_encrypted_payload(&ciphertext));

        let plaintext = decrypt_api_token(&key, project_id, &ciphertext).unwrap();
        assert_eq!(plaintext, "secret-token");
    }

    #[test]
    fn test_aad_binds_token_to_project() {
        let key = test_key();
        let ciphertext = encrypt_api_token(&key, Uuid::new_v4(), "secret-token").unwrap();

        // Decrypting under a different project id must fail
        let result = decrypt_api_token(&key, Uuid::new_v4(), &ciphertext);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[test]
    fn test_legacy_plaintext_passthrough() {
        let key = test_key();
        let project_id = Uuid::new_v4();

        // No version marker: treated as legacy plaintext
        let plaintext = decrypt_api_token(&key, project_id, b"plain-token").unwrap();
        assert_eq!(plaintext, "plain-token");
    }

    #[test]
    fn test_invalid_key_length_rejected() {
        assert!(CryptoKey::new(vec![0u8; 16]).is_err());
    }

    #[test]
    fn test_empty_ciphertext_rejected() {
        let key = test_key();
        let result = decrypt_bytes(&key, b"aad", &[]);
        assert!(matches!(result, Err(CryptoError::EmptyCiphertext)));
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let key = test_key();
        let result = decrypt_bytes(&key, b"aad", &[VERSION_ENCRYPTED, 1, 2, 3]);
        assert!(matches!(result, Err(CryptoError::InvalidFormat)));
    }
}
