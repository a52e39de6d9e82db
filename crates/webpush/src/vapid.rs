//! VAPID (RFC 8292) sender authentication.
//!
//! The assertion is a minimal ES256 JWT:
//! `b64url({"typ":"JWT","alg":"ES256"}) . b64url({aud, exp, sub}) . b64url(r||s)`
//! sent as `Authorization: vapid t=<jwt>, k=<b64url public key>`.

use reqwest::Url;
use serde::Serialize;
use tracing::trace;
use webpush_crypto::{
    base64url_decode_array, base64url_encode, sha256, verify_prehash, CryptoError, Digest,
    PublicKeyBytes, SignatureBytes,
};
use webpush_keys::{Signer, SignerError, MAX_SIGN_ATTEMPTS};

use crate::error::PushError;

/// Lifetime of an assertion, in seconds.
pub const JWT_EXPIRATION_SECS: i64 = 12 * 60 * 60;

#[derive(Serialize)]
struct JwtHeader {
    typ: &'static str,
    alg: &'static str,
}

const JWT_HEADER: JwtHeader = JwtHeader {
    typ: "JWT",
    alg: "ES256",
};

#[derive(Serialize)]
struct JwtClaims<'a> {
    aud: &'a str,
    exp: i64,
    sub: &'a str,
}

/// A signed sender assertion for one push-service origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VapidAssertion {
    /// Compact JWT.
    pub jwt: String,
    /// Base64url signer public key (`k=` parameter).
    pub public_key: String,
}

impl VapidAssertion {
    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("vapid t={}, k={}", self.jwt, self.public_key)
    }
}

/// `scheme://host[:port]` of an absolute endpoint URL. Path and query are dropped.
pub fn audience(endpoint: &str) -> Result<String, PushError> {
    let url = Url::parse(endpoint).map_err(|e| PushError::InvalidEndpoint(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| PushError::InvalidEndpoint(format!("{} has no host", endpoint)))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Check that `subject` is a contact URI push services accept.
pub fn validate_subject(subject: &str) -> Result<(), PushError> {
    let valid = match subject.split_once(':') {
        Some(("mailto", rest)) => !rest.is_empty(),
        Some(("https", _)) => Url::parse(subject)
            .map(|url| url.host_str().is_some())
            .unwrap_or(false),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PushError::InvalidSubject(subject.to_string()))
    }
}

/// Build and sign an assertion for `endpoint`, valid for 12 hours.
pub async fn build_assertion(
    endpoint: &str,
    subject: &str,
    signer: &dyn Signer,
) -> Result<VapidAssertion, PushError> {
    let expires_at = chrono::Utc::now().timestamp() + JWT_EXPIRATION_SECS;
    build_assertion_expiring(endpoint, subject, signer, expires_at).await
}

async fn build_assertion_expiring(
    endpoint: &str,
    subject: &str,
    signer: &dyn Signer,
    expires_at: i64,
) -> Result<VapidAssertion, PushError> {
    let aud = audience(endpoint)?;
    let claims = JwtClaims {
        aud: &aud,
        exp: expires_at,
        sub: subject,
    };

    let signing_input = format!(
        "{}.{}",
        encode_segment(&JWT_HEADER)?,
        encode_segment(&claims)?
    );
    let digest = sha256(signing_input.as_bytes());
    let (signature, public_key) = sign_matching_key(signer, &digest).await?;

    Ok(VapidAssertion {
        jwt: format!("{}.{}", signing_input, base64url_encode(&signature)),
        public_key: base64url_encode(&public_key),
    })
}

/// Sign `digest` and return the signature with the key that produced it.
///
/// `sign` and `public_key` are separate calls, so a rotating signer can
/// switch keys in between. The pair is only returned once the signature
/// verifies under the reported key.
async fn sign_matching_key(
    signer: &dyn Signer,
    digest: &Digest,
) -> Result<(SignatureBytes, PublicKeyBytes), PushError> {
    for attempt in 1..=MAX_SIGN_ATTEMPTS {
        let signature = signer.sign(digest).await?;
        let public_key = signer.public_key();
        if verify_prehash(&public_key, digest, &signature) {
            return Ok((signature, public_key));
        }
        trace!(attempt, "signing key changed after signing, signing again");
    }
    Err(SignerError::KeyRotated {
        attempts: MAX_SIGN_ATTEMPTS,
    }
    .into())
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, PushError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| CryptoError::CryptoFailure(format!("JWT encoding: {}", e)))?;
    Ok(base64url_encode(&json))
}

/// Base64url public key for `PushManager.subscribe({ applicationServerKey })`.
pub fn application_server_key(public_key: &PublicKeyBytes) -> String {
    base64url_encode(public_key)
}

/// Inverse of [`application_server_key`].
pub fn decode_application_server_key(key: &str) -> Result<PublicKeyBytes, PushError> {
    let bytes: PublicKeyBytes =
        base64url_decode_array(key).map_err(|e| PushError::InvalidOption(e.to_string()))?;
    if bytes[0] != 0x04 {
        return Err(PushError::InvalidOption(
            "application server key must be an uncompressed P-256 point".into(),
        ));
    }
    Ok(bytes)
}
