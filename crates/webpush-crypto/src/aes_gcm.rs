//! AES-128-GCM with an externally derived key and nonce.
//!
//! RFC 8188 derives both the key and the nonce from the record's salt, so
//! unlike a random-IV scheme the nonce is an input here. No AAD is used.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};

use crate::error::CryptoError;
use crate::types::{CEK_LENGTH, NONCE_LENGTH};

/// Encrypt `plaintext`, returning ciphertext with the 16-byte tag appended.
pub fn aes128gcm_seal(
    key: &[u8; CEK_LENGTH],
    nonce: &[u8; NONCE_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::CryptoFailure(format!("AES-GCM init: {}", e)))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::CryptoFailure(format!("AES-GCM encrypt: {}", e)))
}

/// Decrypt ciphertext+tag produced by [`aes128gcm_seal`].
pub fn aes128gcm_open(
    key: &[u8; CEK_LENGTH],
    nonce: &[u8; NONCE_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::DecryptionFailed(format!("AES-GCM init: {}", e)))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(format!("AES-GCM decrypt: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TAG_LENGTH;

    #[test]
    fn seal_open_round_trip() {
        let key = [0x11u8; CEK_LENGTH];
        let nonce = [0x22u8; NONCE_LENGTH];
        let sealed = aes128gcm_seal(&key, &nonce, b"hello").unwrap();
        assert_eq!(sealed.len(), 5 + TAG_LENGTH);
        assert_eq!(aes128gcm_open(&key, &nonce, &sealed).unwrap(), b"hello");
    }

    #[test]
    fn tampered_tag_fails() {
        let key = [0x11u8; CEK_LENGTH];
        let nonce = [0x22u8; NONCE_LENGTH];
        let mut sealed = aes128gcm_seal(&key, &nonce, b"hello").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(aes128gcm_open(&key, &nonce, &sealed).is_err());
    }

    #[test]
    fn wrong_nonce_fails() {
        let key = [0x11u8; CEK_LENGTH];
        let sealed = aes128gcm_seal(&key, &[0u8; NONCE_LENGTH], b"hello").unwrap();
        assert!(aes128gcm_open(&key, &[1u8; NONCE_LENGTH], &sealed).is_err());
    }
}
