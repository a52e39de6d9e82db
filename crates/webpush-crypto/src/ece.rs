//! RFC 8291 message encryption (Web Push, `aes128gcm` content coding).
//!
//! Body layout, single record:
//! [salt:16][rs:4 BE][idlen:1][keyid:idlen][ciphertext+tag]
//!
//! The key id is the sender's ephemeral P-256 public key. `rs` is written as
//! the full body length (header + ciphertext). The plaintext carries exactly
//! one padding byte, the final-record delimiter `0x02`.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use zeroize::Zeroize;

use crate::aes_gcm::{aes128gcm_open, aes128gcm_seal};
use crate::error::CryptoError;
use crate::hkdf::hkdf_derive;
use crate::signing::random_secret_key;
use crate::types::{
    AuthSecret, AUTH_SECRET_LENGTH, CEK_LENGTH, FINAL_RECORD_DELIMITER, IKM_LENGTH, NONCE_LENGTH,
    PUBLIC_KEY_LENGTH, RECORD_HEADER_LENGTH, SALT_LENGTH, TAG_LENGTH,
};

const KEY_INFO_PREFIX: &[u8] = b"WebPush: info\x00";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\x00";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\x00";

/// Smallest record size RFC 8188 allows (tag + one delimiter byte + 1).
const MIN_RECORD_SIZE: u32 = 18;

/// Offset of the idlen byte: salt (16) + rs (4).
const IDLEN_OFFSET: usize = SALT_LENGTH + 4;

/// Parsed `aes128gcm` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub salt: [u8; SALT_LENGTH],
    pub record_size: u32,
    pub key_id: Vec<u8>,
}

impl RecordHeader {
    /// Split an encrypted body into its header and the ciphertext that follows.
    pub fn parse(body: &[u8]) -> Result<(Self, &[u8]), CryptoError> {
        if body.len() <= IDLEN_OFFSET {
            return Err(CryptoError::RecordTooShort(body.len()));
        }
        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(&body[..SALT_LENGTH]);
        let mut rs = [0u8; 4];
        rs.copy_from_slice(&body[SALT_LENGTH..IDLEN_OFFSET]);
        let record_size = u32::from_be_bytes(rs);
        let id_len = body[IDLEN_OFFSET] as usize;

        let key_id_end = IDLEN_OFFSET + 1 + id_len;
        if body.len() < key_id_end {
            return Err(CryptoError::RecordTooShort(body.len()));
        }
        let header = Self {
            salt,
            record_size,
            key_id: body[IDLEN_OFFSET + 1..key_id_end].to_vec(),
        };
        Ok((header, &body[key_id_end..]))
    }
}

/// Encrypt a push message to a subscriber.
///
/// # Arguments
/// * `client_public_key` - Subscriber's 65-byte uncompressed P-256 key (`p256dh`)
/// * `auth_secret` - Subscriber's 16-byte authentication secret (`auth`)
/// * `plaintext` - Message payload
///
/// # Returns
/// The complete request body: header followed by one encrypted record.
///
/// A fresh ephemeral key pair and salt are drawn from the OS RNG on every call.
pub fn encrypt(
    client_public_key: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let ua_public = parse_client_public_key(client_public_key)?;
    let auth = parse_auth_secret(auth_secret)?;

    let ephemeral = random_secret_key()?;
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| CryptoError::CryptoFailure(format!("salt generation failed: {}", e)))?;

    seal(&ua_public, &auth, &ephemeral, &salt, plaintext)
}

/// Decrypt a push message body as the receiving user agent.
///
/// # Arguments
/// * `ua_private_key` - Subscriber's 32-byte P-256 private scalar
/// * `auth_secret` - Subscriber's 16-byte authentication secret
/// * `body` - Encrypted body as produced by [`encrypt`]
///
/// # Returns
/// The plaintext with padding and the record delimiter removed.
pub fn decrypt(
    ua_private_key: &[u8],
    auth_secret: &[u8],
    body: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let ua_secret = SecretKey::from_slice(ua_private_key)
        .map_err(|e| CryptoError::MalformedPrivateKey(e.to_string()))?;
    let auth = parse_auth_secret(auth_secret)?;

    let (header, ciphertext) = RecordHeader::parse(body)?;
    if header.record_size < MIN_RECORD_SIZE {
        return Err(CryptoError::InvalidHeader(format!(
            "record size {} below minimum {}",
            header.record_size, MIN_RECORD_SIZE
        )));
    }
    if header.key_id.len() != PUBLIC_KEY_LENGTH {
        return Err(CryptoError::InvalidHeader(format!(
            "key id must be a {}-byte P-256 point, got {} bytes",
            PUBLIC_KEY_LENGTH,
            header.key_id.len()
        )));
    }
    if ciphertext.len() < TAG_LENGTH + 1 {
        return Err(CryptoError::RecordTooShort(body.len()));
    }
    if ciphertext.len() > header.record_size as usize {
        return Err(CryptoError::InvalidHeader(
            "multi-record payloads are not supported".to_string(),
        ));
    }

    let as_public = parse_client_public_key(&header.key_id)?;
    let ua_public = ua_secret.public_key();

    let shared = p256::ecdh::diffie_hellman(ua_secret.to_nonzero_scalar(), as_public.as_affine());
    let mut ikm = derive_ikm(
        shared.raw_secret_bytes().as_slice(),
        &auth,
        ua_public.to_encoded_point(false).as_bytes(),
        &header.key_id,
    )?;
    let keys = derive_content_keys(&ikm, &header.salt);
    ikm.zeroize();
    let (mut cek, mut nonce) = keys?;

    let opened = aes128gcm_open(&cek, &nonce, ciphertext);
    cek.zeroize();
    nonce.zeroize();
    let mut padded = opened?;

    let plaintext_len = strip_padding(&padded)?;
    padded.truncate(plaintext_len);
    Ok(padded)
}

/// Validate a subscriber key: 65 bytes, uncompressed tag, on the P-256 curve.
pub fn parse_client_public_key(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    if bytes.len() != PUBLIC_KEY_LENGTH {
        return Err(CryptoError::MalformedKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_LENGTH,
            bytes.len()
        )));
    }
    if bytes[0] != 0x04 {
        return Err(CryptoError::MalformedKey(
            "expected uncompressed point (0x04 prefix)".to_string(),
        ));
    }
    PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| CryptoError::MalformedKey("point is not on the P-256 curve".to_string()))
}

fn parse_auth_secret(bytes: &[u8]) -> Result<AuthSecret, CryptoError> {
    AuthSecret::try_from(bytes).map_err(|_| CryptoError::MalformedSecret {
        expected: AUTH_SECRET_LENGTH,
        got: bytes.len(),
    })
}

/// Encrypt with caller-supplied ephemeral key and salt.
fn seal(
    ua_public: &PublicKey,
    auth: &AuthSecret,
    ephemeral: &SecretKey,
    salt: &[u8; SALT_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let ua_point = ua_public.to_encoded_point(false);
    let as_point = ephemeral.public_key().to_encoded_point(false);

    let shared = p256::ecdh::diffie_hellman(ephemeral.to_nonzero_scalar(), ua_public.as_affine());
    let mut ikm = derive_ikm(
        shared.raw_secret_bytes().as_slice(),
        auth,
        ua_point.as_bytes(),
        as_point.as_bytes(),
    )?;
    let keys = derive_content_keys(&ikm, salt);
    ikm.zeroize();
    let (mut cek, mut nonce) = keys?;

    let mut padded = Vec::with_capacity(plaintext.len() + 1);
    padded.extend_from_slice(plaintext);
    padded.push(FINAL_RECORD_DELIMITER);

    let sealed = aes128gcm_seal(&cek, &nonce, &padded);
    cek.zeroize();
    nonce.zeroize();
    padded.zeroize();
    let ciphertext = sealed?;

    let record_size = u32::try_from(ciphertext.len() + RECORD_HEADER_LENGTH)
        .map_err(|_| CryptoError::CryptoFailure("payload too large".to_string()))?;

    let mut body = Vec::with_capacity(RECORD_HEADER_LENGTH + ciphertext.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(&record_size.to_be_bytes());
    body.push(PUBLIC_KEY_LENGTH as u8);
    body.extend_from_slice(as_point.as_bytes());
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// IKM = HKDF(salt=auth, ikm=ecdh, info="WebPush: info\0" || ua_public || as_public, L=32)
fn derive_ikm(
    ecdh_secret: &[u8],
    auth: &AuthSecret,
    ua_public: &[u8],
    as_public: &[u8],
) -> Result<[u8; IKM_LENGTH], CryptoError> {
    let mut key_info = Vec::with_capacity(KEY_INFO_PREFIX.len() + 2 * PUBLIC_KEY_LENGTH);
    key_info.extend_from_slice(KEY_INFO_PREFIX);
    key_info.extend_from_slice(ua_public);
    key_info.extend_from_slice(as_public);
    hkdf_derive(ecdh_secret, auth, &key_info)
}

/// CEK and nonce from IKM and the record salt.
fn derive_content_keys(
    ikm: &[u8; IKM_LENGTH],
    salt: &[u8; SALT_LENGTH],
) -> Result<([u8; CEK_LENGTH], [u8; NONCE_LENGTH]), CryptoError> {
    let cek = hkdf_derive(ikm, salt, CEK_INFO)?;
    let nonce = hkdf_derive(ikm, salt, NONCE_INFO)?;
    Ok((cek, nonce))
}

/// Length of the plaintext once trailing zero padding and the delimiter are removed.
fn strip_padding(padded: &[u8]) -> Result<usize, CryptoError> {
    let delimiter_at = padded
        .iter()
        .rposition(|&b| b != 0)
        .ok_or(CryptoError::InvalidPadding)?;
    if padded[delimiter_at] != FINAL_RECORD_DELIMITER {
        return Err(CryptoError::InvalidPadding);
    }
    Ok(delimiter_at)
}
