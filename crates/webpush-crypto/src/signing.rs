//! ECDSA P-256 key generation, signing and verification primitives.
//!
//! Signatures are IEEE P1363 format (raw r||s, 64 bytes) over a caller-computed
//! SHA-256 digest, which is the form ES256 JWTs carry.

use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::SecretKey;
use sha2::{Digest as _, Sha256};

use crate::error::CryptoError;
use crate::types::{Digest, PublicKeyBytes, PRIVATE_KEY_LENGTH, SIGNATURE_LENGTH};

/// Scalars outside [1, n) are rejected; the chance of hitting one is ~2^-128.
const KEYGEN_ATTEMPTS: usize = 8;

/// Draw a uniformly random P-256 secret key from the OS RNG.
pub fn random_secret_key() -> Result<SecretKey, CryptoError> {
    let mut bytes = [0u8; PRIVATE_KEY_LENGTH];
    for _ in 0..KEYGEN_ATTEMPTS {
        getrandom::getrandom(&mut bytes)
            .map_err(|e| CryptoError::CryptoFailure(format!("RNG failed: {}", e)))?;
        let candidate = SecretKey::from_slice(&bytes);
        zeroize::Zeroize::zeroize(&mut bytes);
        if let Ok(secret) = candidate {
            return Ok(secret);
        }
    }
    Err(CryptoError::CryptoFailure(
        "could not generate a valid P-256 scalar".to_string(),
    ))
}

/// Generate a new P-256 signing key pair.
pub fn generate_p256_keypair() -> Result<SigningKey, CryptoError> {
    Ok(SigningKey::from(random_secret_key()?))
}

/// SHA-256 of `message`.
pub fn sha256(message: &[u8]) -> Digest {
    Sha256::digest(message).into()
}

/// Sign a SHA-256 digest with ECDSA P-256.
///
/// # Returns
/// 64-byte IEEE P1363 signature (r||s)
pub fn sign_prehash(key: &SigningKey, digest: &Digest) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
    let signature: Signature = key
        .sign_prehash(digest)
        .map_err(|e| CryptoError::CryptoFailure(format!("ECDSA sign: {}", e)))?;
    Ok(signature_bytes(&signature))
}

/// Verify a P1363 signature over a SHA-256 digest.
///
/// Returns false for any malformed key or signature; never errors.
pub fn verify_prehash(public_key: &[u8], digest: &Digest, signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify_prehash(digest, &signature).is_ok()
}

/// Convert an ASN.1 DER `ECDSA-Sig-Value` into 64-byte P1363, left-padding r and s.
pub fn der_to_p1363(der: &[u8]) -> Result<[u8; SIGNATURE_LENGTH], CryptoError> {
    let signature =
        Signature::from_der(der).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(signature_bytes(&signature))
}

/// Uncompressed SEC1 encoding (0x04 || X || Y) of a verifying key.
pub fn public_key_bytes(key: &VerifyingKey) -> PublicKeyBytes {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}

fn signature_bytes(signature: &Signature) -> [u8; SIGNATURE_LENGTH] {
    let mut out = [0u8; SIGNATURE_LENGTH];
    out.copy_from_slice(&signature.to_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let key = generate_p256_keypair().unwrap();
        let public = public_key_bytes(key.verifying_key());
        let digest = sha256(b"hello world");

        let signature = sign_prehash(&key, &digest).unwrap();
        assert!(verify_prehash(&public, &digest, &signature));
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = generate_p256_keypair().unwrap();
        let key2 = generate_p256_keypair().unwrap();
        let digest = sha256(b"hello world");

        let signature = sign_prehash(&key1, &digest).unwrap();
        assert!(!verify_prehash(
            &public_key_bytes(key2.verifying_key()),
            &digest,
            &signature
        ));
    }

    #[test]
    fn wrong_digest_fails() {
        let key = generate_p256_keypair().unwrap();
        let public = public_key_bytes(key.verifying_key());

        let signature = sign_prehash(&key, &sha256(b"original")).unwrap();
        assert!(!verify_prehash(&public, &sha256(b"tampered"), &signature));
    }

    #[test]
    fn public_key_is_uncompressed_point() {
        let key = generate_p256_keypair().unwrap();
        let public = public_key_bytes(key.verifying_key());
        assert_eq!(public[0], 0x04);
    }

    #[test]
    fn der_signature_converts_to_p1363() {
        let key = generate_p256_keypair().unwrap();
        let digest = sha256(b"kms");
        let signature: Signature = key.sign_prehash(&digest).unwrap();
        let der = signature.to_der();

        let p1363 = der_to_p1363(der.as_bytes()).unwrap();
        assert_eq!(p1363, signature_bytes(&signature));
        assert!(verify_prehash(
            &public_key_bytes(key.verifying_key()),
            &digest,
            &p1363
        ));
    }

    #[test]
    fn garbage_der_is_rejected() {
        assert!(matches!(
            der_to_p1363(&[0x30, 0x02, 0x01]),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn malformed_inputs_verify_false() {
        let digest = sha256(b"test");
        assert!(!verify_prehash(&[0u8; 65], &digest, &[0u8; 64]));
        let key = generate_p256_keypair().unwrap();
        let public = public_key_bytes(key.verifying_key());
        assert!(!verify_prehash(&public, &digest, &[0u8; 63]));
    }

    #[test]
    fn sha256_known_answer() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
