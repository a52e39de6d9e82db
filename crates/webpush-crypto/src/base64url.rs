use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::CryptoError;

/// Base64url encode bytes without padding.
pub fn base64url_encode(data: &[u8]) -> String {
    Base64UrlUnpadded::encode_string(data)
}

/// Base64url decode a string to bytes.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64UrlUnpadded::decode_vec(s)
}

/// Decode base64url into a fixed-size array, rejecting any other decoded length.
pub fn base64url_decode_array<const N: usize>(s: &str) -> Result<[u8; N], CryptoError> {
    let bytes = base64url_decode(s).map_err(|e| CryptoError::Base64Decode(e.to_string()))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        CryptoError::Base64Decode(format!("expected {} bytes, got {}", N, bytes.len()))
    })
}
