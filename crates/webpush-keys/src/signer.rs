use std::sync::Arc;

use async_trait::async_trait;
use webpush_crypto::{Digest, PublicKeyBytes, SignatureBytes};

use crate::error::SignerError;

/// A P-256 signing capability.
///
/// Implementations sign a SHA-256 digest and return a 64-byte IEEE P1363
/// (r||s) signature. Backends that produce DER must convert before returning.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign a 32-byte digest.
    async fn sign(&self, digest: &Digest) -> Result<SignatureBytes, SignerError>;

    /// Uncompressed 65-byte public key (0x04 || X || Y).
    fn public_key(&self) -> PublicKeyBytes;
}

#[async_trait]
impl<S: Signer + ?Sized> Signer for Arc<S> {
    async fn sign(&self, digest: &Digest) -> Result<SignatureBytes, SignerError> {
        (**self).sign(digest).await
    }

    fn public_key(&self) -> PublicKeyBytes {
        (**self).public_key()
    }
}
