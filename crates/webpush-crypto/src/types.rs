/// Content coding token for RFC 8188 / RFC 8291 payloads.
pub const CONTENT_ENCODING: &str = "aes128gcm";

/// Uncompressed SEC1 P-256 point length: 0x04 || x (32) || y (32).
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Raw P-256 private scalar length.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// User agent authentication secret length (RFC 8291 §2).
pub const AUTH_SECRET_LENGTH: usize = 16;

/// Per-message salt length (RFC 8188 §2.1).
pub const SALT_LENGTH: usize = 16;

/// AES-128-GCM content encryption key length.
pub const CEK_LENGTH: usize = 16;

/// AES-GCM nonce length (96 bits).
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const TAG_LENGTH: usize = 16;

/// HKDF output used as IKM for the content key schedule (RFC 8291 §3.3).
pub const IKM_LENGTH: usize = 32;

/// SHA-256 digest length, the input handed to a signer.
pub const DIGEST_LENGTH: usize = 32;

/// IEEE P1363 ECDSA P-256 signature length (r || s).
pub const SIGNATURE_LENGTH: usize = 64;

/// Header length for a 65-byte key id:
/// salt (16) || rs (4) || idlen (1) || keyid (65).
pub const RECORD_HEADER_LENGTH: usize = SALT_LENGTH + 4 + 1 + PUBLIC_KEY_LENGTH;

/// Padding delimiter marking the final (and only) record.
pub const FINAL_RECORD_DELIMITER: u8 = 0x02;

/// Uncompressed 65-byte P-256 public key.
pub type PublicKeyBytes = [u8; PUBLIC_KEY_LENGTH];

/// 64-byte IEEE P1363 signature.
pub type SignatureBytes = [u8; SIGNATURE_LENGTH];

/// 32-byte SHA-256 digest.
pub type Digest = [u8; DIGEST_LENGTH];

/// 16-byte user agent authentication secret.
pub type AuthSecret = [u8; AUTH_SECRET_LENGTH];
