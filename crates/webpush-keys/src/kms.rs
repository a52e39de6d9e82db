//! Signer whose private key never leaves a remote key management service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePublicKey;
use p256::PublicKey;
use tracing::{debug, trace};
use webpush_crypto::{
    base64url_encode, der_to_p1363, Digest, PublicKeyBytes, SignatureBytes, PUBLIC_KEY_LENGTH,
};

use crate::error::{BoxError, KeyError, SignerError};
use crate::signer::Signer;

/// Remote asymmetric signing backend (Cloud KMS, HSM gateway, ...).
///
/// `key_name` is the backend's identifier for one key version.
#[async_trait]
pub trait KeyManagementService: Send + Sync {
    /// PEM-encoded SubjectPublicKeyInfo for the key.
    async fn public_key_pem(&self, key_name: &str) -> Result<String, BoxError>;

    /// ECDSA signature over a SHA-256 digest, ASN.1 DER encoded.
    async fn asymmetric_sign(&self, key_name: &str, digest: &Digest) -> Result<Vec<u8>, BoxError>;
}

pub struct KmsSigner {
    service: Arc<dyn KeyManagementService>,
    key_name: String,
    public_key: PublicKeyBytes,
}

impl KmsSigner {
    /// Fetch and validate the public key for `key_name`.
    ///
    /// The key must be a P-256 key; anything else is rejected here rather than
    /// at first signature.
    pub async fn connect(
        service: Arc<dyn KeyManagementService>,
        key_name: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let key_name = key_name.into();
        let pem = service
            .public_key_pem(&key_name)
            .await
            .map_err(SignerError::Backend)?;
        let public = PublicKey::from_public_key_pem(&pem)
            .map_err(|e| KeyError::Pem(format!("KMS public key is not P-256: {}", e)))?;

        let point = public.to_encoded_point(false);
        let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
        public_key.copy_from_slice(point.as_bytes());

        debug!(
            key_name = %key_name,
            public_key = %base64url_encode(&public_key),
            "connected KMS signer"
        );
        Ok(Self {
            service,
            key_name,
            public_key,
        })
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn public_key_base64(&self) -> String {
        base64url_encode(&self.public_key)
    }
}

impl fmt::Debug for KmsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSigner")
            .field("key_name", &self.key_name)
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Signer for KmsSigner {
    async fn sign(&self, digest: &Digest) -> Result<SignatureBytes, SignerError> {
        trace!(key_name = %self.key_name, "requesting KMS signature");
        let der = self
            .service
            .asymmetric_sign(&self.key_name, digest)
            .await
            .map_err(SignerError::Backend)?;
        Ok(der_to_p1363(&der)?)
    }

    fn public_key(&self) -> PublicKeyBytes {
        self.public_key
    }
}
