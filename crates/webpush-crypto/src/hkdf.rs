//! HKDF-SHA256 key derivation.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::CryptoError;

/// Derive `N` bytes using HKDF-SHA256 (extract then expand).
///
/// # Arguments
/// * `ikm` - Input keying material
/// * `salt` - Extract salt
/// * `info` - Expand context string
pub fn hkdf_derive<const N: usize>(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
) -> Result<[u8; N], CryptoError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; N];
    hk.expand(info, &mut okm)
        .map_err(|e| CryptoError::CryptoFailure(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}
