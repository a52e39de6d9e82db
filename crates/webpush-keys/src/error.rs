use thiserror::Error;

/// Boxed error from an external backend (KMS, usage oracle, transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while producing a signature.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] webpush_crypto::CryptoError),

    /// The current key changed on every attempt; see [`MAX_SIGN_ATTEMPTS`].
    ///
    /// [`MAX_SIGN_ATTEMPTS`]: crate::MAX_SIGN_ATTEMPTS
    #[error("Signing key rotated during each of {attempts} signing attempts")]
    KeyRotated { attempts: usize },

    /// Error returned by a remote signing backend, kept intact so callers can
    /// downcast it and decide whether it is retryable.
    #[error("Signer backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Failure in key loading or key-set management.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Cannot remove the current signing key")]
    CannotRemoveCurrent,

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("No previous keys to remove")]
    NoPreviousKeys,

    #[error("Key already present: {0}")]
    DuplicateKey(String),

    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("PEM error: {0}")]
    Pem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Usage lookup failed: {0}")]
    Oracle(#[source] BoxError),
}
