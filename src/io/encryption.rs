//! Encryption stage of the byte pipeline (§4.6): AES-256-GCM streaming AEAD
//! with per-resource key material, generated on resource create and stored
//! in the resource directory (§6.1's `encryption-key/`). Grounded on
//! `crypto/file_encryption/mod.rs`'s AES-256-GCM usage, narrowed to the one
//! mode the spec calls for and keyed directly rather than through the
//! teacher's password-based KDF (which this engine has no use for).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

pub const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("ciphertext shorter than the nonce prefix")]
    Truncated,
    #[error("AEAD authentication failed")]
    AuthenticationFailed,
}

/// Per-resource symmetric key material, generated once at resource create
/// time (§6.2's `encryption-key/`).
#[derive(Clone)]
pub struct ResourceKey([u8; KEY_LEN]);

impl ResourceKey {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Encrypts `plaintext`, prefixing the output with a freshly generated
/// 12-byte nonce.
pub fn encrypt(key: &ResourceKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext =
        cipher.encrypt(nonce, plaintext).map_err(|_| EncryptionError::AuthenticationFailed)?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`encrypt`]: strips the nonce prefix and authenticates.
pub fn decrypt(key: &ResourceKey, sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if sealed.len() < NONCE_LEN {
        return Err(EncryptionError::Truncated);
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EncryptionError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = ResourceKey::generate();
        let sealed = encrypt(&key, b"leaf page bytes").unwrap();
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"leaf page bytes");
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let key = ResourceKey::generate();
        let other = ResourceKey::generate();
        let sealed = encrypt(&key, b"secret").unwrap();
        assert_eq!(decrypt(&other, &sealed), Err(EncryptionError::AuthenticationFailed));
    }

    #[test]
    fn truncated_ciphertext_is_rejected() {
        let key = ResourceKey::generate();
        assert_eq!(decrypt(&key, &[0u8; 4]), Err(EncryptionError::Truncated));
    }
}
