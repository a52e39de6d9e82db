//! Cryptographic primitives for Web Push.
//!
//! - RFC 8291 message encryption (`aes128gcm` content coding)
//! - HKDF-SHA256 and AES-128-GCM building blocks
//! - ECDSA P-256 prehash signing in IEEE P1363 form
//! - Unpadded base64url helpers

pub mod aes_gcm;
pub mod base64url;
pub mod ece;
pub mod error;
pub mod hkdf;
pub mod signing;
pub mod types;

pub use base64url::{base64url_decode, base64url_decode_array, base64url_encode};
pub use ece::{decrypt, encrypt, parse_client_public_key, RecordHeader};
pub use error::CryptoError;
pub use signing::{
    der_to_p1363, generate_p256_keypair, public_key_bytes, random_secret_key, sha256,
    sign_prehash, verify_prehash,
};
pub use types::*;
